use cohort_model::{CL_ARGS_TOKEN, WorkerSpec};

use crate::error::{ExecError, ExecResult};

/// Full argument vector of one attempt: positional args, then the tokenized argument string.
pub fn worker_argv(spec: &WorkerSpec) -> ExecResult<Vec<String>> {
    let mut argv = spec.args.clone();
    if let Some(raw) = &spec.arg_string {
        argv.extend(split_arg_string(raw)?);
    }
    Ok(argv)
}

/// Split a free-form argument string on whitespace.
///
/// The value following `--cl-args` is kept whole. When it starts with `'` or `"`
/// it runs to the matching quote and the quotes are dropped; otherwise it is the next word.
pub fn split_arg_string(raw: &str) -> ExecResult<Vec<String>> {
    let mut out = Vec::new();
    let mut rest = raw.trim_start();

    while !rest.is_empty() {
        let (word, tail) = next_word(rest);
        out.push(word.to_string());
        rest = tail.trim_start();

        if word != CL_ARGS_TOKEN || rest.is_empty() {
            continue;
        }

        let first = rest.chars().next().unwrap_or(' ');
        if first == '\'' || first == '"' {
            let body = &rest[1..];
            let end = body
                .find(first)
                .ok_or_else(|| ExecError::UnterminatedQuote(raw.to_string()))?;
            out.push(body[..end].to_string());
            rest = body[end + 1..].trim_start();
        } else {
            let (value, tail) = next_word(rest);
            out.push(value.to_string());
            rest = tail.trim_start();
        }
    }
    Ok(out)
}

fn next_word(s: &str) -> (&str, &str) {
    match s.find(char::is_whitespace) {
        Some(idx) => (&s[..idx], &s[idx..]),
        None => (s, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_any_whitespace() {
        let argv = split_arg_string("  --host  10.0.0.1\t--port 443\n").unwrap();
        assert_eq!(argv, vec!["--host", "10.0.0.1", "--port", "443"]);
    }

    #[test]
    fn empty_string_yields_nothing() {
        assert!(split_arg_string("").unwrap().is_empty());
        assert!(split_arg_string("   ").unwrap().is_empty());
    }

    #[test]
    fn cl_args_single_quoted_value_stays_whole() {
        let argv = split_arg_string("--log-level debug --cl-args '--a 1 --b two' --x").unwrap();
        assert_eq!(
            argv,
            vec!["--log-level", "debug", "--cl-args", "--a 1 --b two", "--x"]
        );
    }

    #[test]
    fn cl_args_double_quoted_value_may_hold_single_quotes() {
        let argv = split_arg_string(r#"--cl-args "--msg 'hi there'""#).unwrap();
        assert_eq!(argv, vec!["--cl-args", "--msg 'hi there'"]);
    }

    #[test]
    fn cl_args_unquoted_value_is_next_word() {
        let argv = split_arg_string("--cl-args --verbose --other").unwrap();
        assert_eq!(argv, vec!["--cl-args", "--verbose", "--other"]);
    }

    #[test]
    fn cl_args_at_end_is_kept() {
        assert_eq!(split_arg_string("--cl-args").unwrap(), vec!["--cl-args"]);
    }

    #[test]
    fn quotes_elsewhere_are_not_special() {
        let argv = split_arg_string("--name 'a b'").unwrap();
        assert_eq!(argv, vec!["--name", "'a", "b'"]);
    }

    #[test]
    fn unterminated_quote_is_an_error() {
        let err = split_arg_string("--cl-args '--a 1").unwrap_err();
        assert!(matches!(err, ExecError::UnterminatedQuote(_)));
    }

    #[test]
    fn argv_appends_tokens_after_positional_args() {
        let spec = WorkerSpec::new("/opt/run.sh")
            .args(["--script", "setup"])
            .arg_string("--cl-args '--x 1' --wait-for ONBOARD_DONE");

        assert_eq!(
            worker_argv(&spec).unwrap(),
            vec![
                "--script",
                "setup",
                "--cl-args",
                "--x 1",
                "--wait-for",
                "ONBOARD_DONE"
            ]
        );
    }
}
