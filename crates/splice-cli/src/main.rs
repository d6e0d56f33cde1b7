use anyhow::Result;
use splice_cli::{command, failure_notice, init_logging, run, CliOptions};

fn main() -> Result<()> {
    // Parse command line arguments
    let matches = command().get_matches();
    let options = CliOptions::from_matches(&matches);

    // Initialize logging
    init_logging(options.verbose);

    if let Err(e) = run(&options) {
        if let Some(notice) = failure_notice(&e) {
            eprintln!("{notice}");
        }
        return Err(e);
    }
    Ok(())
}
