use crate::cli::Commands;
use snapkey_core::config::ensure_config_dir;
use snapkey_core::{Result, SnippetStore};
use snapkey_daemon::{daemon_status, run_worker, start_daemon, stop_daemon};

pub fn handle_command(command: Commands) -> Result<()> {
    match command {
        Commands::Add {
            keyword,
            replacement,
        } => add_snippet(keyword, replacement),
        Commands::Remove { keyword } => remove_snippet(&keyword),
        Commands::List => list_snippets(),
        Commands::Start => start_daemon(),
        Commands::Stop => stop_daemon(),
        Commands::Status => daemon_status(),
        Commands::Run | Commands::DaemonWorker => run_worker(),
    }
}

fn add_snippet(keyword: String, replacement: String) -> Result<()> {
    ensure_config_dir()?;
    let mut store = SnippetStore::load()?;
    store.add(keyword.clone(), replacement)?;
    store.save()?;
    println!("Snippet '{}' added.", keyword);
    println!("Restart the daemon to pick up the change.");
    Ok(())
}

fn remove_snippet(keyword: &str) -> Result<()> {
    let mut store = SnippetStore::load()?;
    store.remove(keyword)?;
    store.save()?;
    println!("Snippet '{}' removed.", keyword);
    Ok(())
}

fn list_snippets() -> Result<()> {
    let store = SnippetStore::load()?;
    if store.snippets.is_empty() {
        println!("No snippets defined. Add one with 'snapkey add'.");
        return Ok(());
    }

    for category in &store.categories {
        let marker = if category.enabled { "" } else { " (disabled)" };
        println!("{}{}:", category.name, marker);
        for snippet in store.snippets.iter().filter(|s| s.category_id == category.id) {
            let marker = if snippet.enabled { "" } else { " (disabled)" };
            let preview: String = snippet.replacement.chars().take(40).collect();
            println!("  {}{} -> {}", snippet.keyword, marker, preview);
        }
    }
    Ok(())
}
