//! Per-file translation driver
//!
//! Each input file gets a fresh [`Translator`] session; one file's failure
//! never aborts the rest of the run.

use crate::frontend::Parser;
use crate::translator::Translator;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

/// Options forwarded from the command line
#[derive(Debug, Clone, Default)]
pub struct TranslateConfig {
    pub trace_scan: bool,
    pub trace_parse: bool,
    pub dump_tacos: bool,
    pub dump_symbols: bool,
}

/// Translate one file, reporting diagnostics as they occur.
/// Returns whether the file translated without error.
pub fn translate_file(path: &Path, config: &TranslateConfig) -> anyhow::Result<bool> {
    let source = fs::read_to_string(path)
        .map_err(|err| anyhow::anyhow!("{} : {}", path.display(), err))?;
    let file = path.display().to_string();

    let mut translator = Translator::new(file, &source);
    let result = Parser::new(
        &source,
        &mut translator,
        config.trace_scan,
        config.trace_parse,
    )
    .and_then(|mut parser| parser.translate_program());

    if let Err(err) = result {
        translator.report(&err);
    }

    let ok = !translator.failed();
    if ok {
        if config.dump_tacos {
            print!("{}", translator.dump_tacos());
        }
        if config.dump_symbols {
            print!("{}", translator.dump_symbols());
        }
    }
    Ok(ok)
}

/// Translate every listed file, echoing a per-file result line.
/// Returns true only when all files translated successfully.
pub fn run(files: &[PathBuf], config: &TranslateConfig) -> bool {
    let mut all_ok = true;
    for path in files {
        // an unexpected panic inside one translation is downgraded to an
        // ordinary failure for that file
        let outcome =
            panic::catch_unwind(AssertUnwindSafe(|| translate_file(path, config)));
        let ok = match outcome {
            Ok(Ok(ok)) => ok,
            Ok(Err(err)) => {
                eprintln!("{err}");
                false
            }
            Err(_) => {
                eprintln!("{} : internal error during translation", path.display());
                false
            }
        };
        if ok {
            println!("{} : translation completed successfully", path.display());
        } else {
            println!("{} : translation failed", path.display());
            all_ok = false;
        }
    }
    all_ok
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_source(name: &str, contents: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("mmc-driver-test-{name}-{}", std::process::id()));
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_well_formed_file_succeeds() {
        let path = write_source("ok.mm", "int main() { int x; x = 1; }");
        let ok = translate_file(&path, &TranslateConfig::default()).unwrap();
        assert!(ok);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_syntax_error_fails() {
        let path = write_source("bad.mm", "int main( {");
        let ok = translate_file(&path, &TranslateConfig::default()).unwrap();
        assert!(!ok);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let path = PathBuf::from("/nonexistent/input.mm");
        assert!(translate_file(&path, &TranslateConfig::default()).is_err());
    }

    #[test]
    fn test_one_failure_does_not_abort_the_run() {
        let bad = write_source("bad2.mm", "int main() { int x; int x; }");
        let good = write_source("good2.mm", "int main() { int y; y = 2; }");

        let all_ok = run(&[bad.clone(), good.clone()], &TranslateConfig::default());
        assert!(!all_ok);
        // the well-formed file still translates on its own
        assert!(translate_file(&good, &TranslateConfig::default()).unwrap());

        let _ = fs::remove_file(&bad);
        let _ = fs::remove_file(&good);
    }
}
