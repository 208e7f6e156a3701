use cache::TableCache;

mod cache;
mod compute;
mod data;
mod read;
mod render;

fn main() -> Result<(), anyhow::Error> {
    env_logger::init();
    let mut json = false;
    let mut positional: Vec<String> = Vec::new();
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--json" => json = true,
            _ => positional.push(arg),
        }
    }
    if positional.len() > 2 {
        anyhow::bail!("usage: csm_tracker [tracker.xlsx] [account] [--json]");
    }
    let path = positional
        .first()
        .cloned()
        .or_else(|| std::env::var("CSM_TRACKER_FILE").ok())
        .unwrap_or_else(|| "csm_tracker.xlsx".to_string());
    let path = std::path::PathBuf::from(path);

    let mut cache = TableCache::new();
    let table = cache.load(&path)?;
    match positional.get(1) {
        Some(account) => {
            let view = compute::build_view(table, account)?;
            if json {
                render::write_account_json(std::io::stdout(), &view)?;
            } else {
                render::write_account_report(std::io::stdout(), &view)?;
            }
        }
        None => render::write_account_list(std::io::stdout(), table)?,
    }
    Ok(())
}
