use sitecal::cli::run;
use sitecal::error::SitecalError;

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        // Missing records and rejected input are the caller's problem
        let is_user_error = matches!(
            e.downcast_ref::<SitecalError>(),
            Some(err) if !matches!(err, SitecalError::Serialization(_))
        );

        let error_str: String = e.to_string();
        if !is_user_error && (error_str.contains("database") || error_str.contains("constraint") ||
           error_str.contains("corruption") || error_str.contains("SQLite") ||
           error_str.contains("Failed to")) {
            eprintln!("Internal error: {}", e);
            let mut source = e.source();
            if source.is_some() {
                eprintln!("\nCaused by:");
                let mut indent = 1;
                while let Some(err) = source {
                    eprintln!("{:indent$}  {}", "", err);
                    source = err.source();
                    indent += 1;
                }
            }
            std::process::exit(2);
        } else {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
