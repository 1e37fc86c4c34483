use anyhow::{bail, Result};

use state_entity_search::utils::logging;
use state_entity_search::{App, Config, SearchCriteria};

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    let config = Config::from_env();
    let criteria = parse_args(std::env::args().skip(1).collect())?;

    let report = App::new(config).run(&criteria).await?;
    let tally = report.tally();
    if tally.found == 0 && tally.failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

/// `<entity name>` searches by name; `--id <identifier>` searches by ID.
fn parse_args(args: Vec<String>) -> Result<SearchCriteria> {
    match args.as_slice() {
        [flag, id] if flag == "--id" => Ok(SearchCriteria::by_identifier(id.as_str())),
        [name] => Ok(SearchCriteria::by_name(name.as_str())),
        _ => bail!("usage: state_entity_search <entity name> | --id <identifier>"),
    }
}
