use impostor_compress::SqliteStore;
use impostor_core::CompressorConfig;
use impostor_telemetry::Paths;

pub fn run(paths: &Paths) -> anyhow::Result<()> {
    std::fs::create_dir_all(&paths.data_dir)?;

    let config_path = paths.config_file();
    if config_path.exists() {
        // Validate what is already there rather than overwrite it
        CompressorConfig::load(&config_path)?;
        println!("✓ Config already present at {}", config_path.display());
    } else {
        let json = serde_json::to_string_pretty(&CompressorConfig::default())?;
        impostor_telemetry::atomic_write(&config_path, json.as_bytes())?;
        println!("✓ Wrote default config to {}", config_path.display());
    }

    SqliteStore::open(&paths.database())?;
    println!("✓ Database ready at {}", paths.database().display());

    if std::env::var("OPENAI_API_KEY").map_or(true, |k| k.trim().is_empty()) {
        println!("\nOPENAI_API_KEY is not set; summaries will use local truncation.");
    }
    Ok(())
}
