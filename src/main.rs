use clap::{Arg, ArgAction, Command};
use interline::mt::{
    GOOGLE_LANGUAGES, GoogleTranslateProvider, MachineTranslator, MockMode, MockTranslator,
};
use interline::overlay::annotate;
use interline::{
    Config, DocumentTranslator, JsonFileStorage, LexicalRules, SourceDocument,
    TranslationCacheStore,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = Command::new("interline")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Translate the natural-language phrases of a source file")
        .arg(
            Arg::new("file")
                .help("Source file to translate")
                .required_unless_present("languages")
                .index(1),
        )
        .arg(
            Arg::new("target-locale")
                .help("Target language code (default: from config, else zh-CN)")
                .index(2),
        )
        .arg(
            Arg::new("source-locale")
                .long("source")
                .short('s')
                .help("Source language code (default: from config, else en)"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("cache")
                .long("cache")
                .help("Translation cache file (default: from config)"),
        )
        .arg(
            Arg::new("mock")
                .long("mock")
                .short('m')
                .help("Use mock translator instead of Google Translate")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("annotate")
                .long("annotate")
                .short('a')
                .help("Print the file with translations inlined as phrase「translation」")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("languages")
                .long("languages")
                .help("List supported target languages and exit")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log every skipped comment and string")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let level = if matches.get_flag("verbose") { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if matches.get_flag("languages") {
        for (code, name) in GOOGLE_LANGUAGES {
            println!("{:<8} {}", code, name);
        }
        return Ok(());
    }

    let config = Config::load(matches.get_one::<String>("config").map(Path::new))?;
    let source_locale = matches
        .get_one::<String>("source-locale")
        .cloned()
        .unwrap_or_else(|| config.source_language.clone());
    let target_locale = matches
        .get_one::<String>("target-locale")
        .cloned()
        .unwrap_or_else(|| config.target_language.clone());
    let use_mock = matches.get_flag("mock");

    let file = matches
        .get_one::<String>("file")
        .map(PathBuf::from)
        .ok_or("Missing source file")?;
    let document = SourceDocument::new(std::fs::read_to_string(&file)?);
    let rules = LexicalRules::for_path(&file);

    let store = Arc::new(TranslationCacheStore::new());
    let storage = Arc::new(JsonFileStorage::new(
        matches
            .get_one::<String>("cache")
            .map(PathBuf::from)
            .unwrap_or_else(|| config.cache_path.clone()),
    ));
    if let Err(e) = store.load_from(storage.as_ref()) {
        warn!("Starting with an empty cache: {}", e);
    }

    let provider: Arc<dyn MachineTranslator> = if use_mock {
        Arc::new(MockTranslator::new(MockMode::Suffix))
    } else {
        let Some(api_key) = config.api_key() else {
            eprintln!("❌ No Google Translate API key configured");
            eprintln!("   Set google_api_key in the config file,");
            eprintln!("   or export GOOGLE_TRANSLATE_API_KEY=your_api_key");
            eprintln!("   Or use --mock to use mock translator");
            return Err("Missing API key".into());
        };
        let mut google = GoogleTranslateProvider::new(api_key)?;
        if let Some(base_url) = &config.google_base_url {
            google = google.with_base_url(base_url);
        }
        Arc::new(google)
    };

    let mut translator = DocumentTranslator::from_config(provider, store.clone(), &config);
    // Mock output never reaches the cache file
    if !use_mock {
        translator = translator.with_storage(storage);
    }

    let report = match translator
        .translate_document(&document, &rules, &source_locale, &target_locale)
        .await
    {
        Ok(report) => report,
        Err(e) => {
            eprintln!("❌ Translation failed: {}", e.message());
            return Err(e.into());
        }
    };

    let cache = store.cache_for(&source_locale, &target_locale);
    if matches.get_flag("annotate") {
        print!(
            "{}",
            annotate(&document, &rules, &cache, translator.custom_translations())
        );
        return Ok(());
    }

    println!("📝 {}", file.display());
    println!("🌍 {} → {}", source_locale, target_locale);
    println!(
        "   {} phrases sent, {} translated, {} comments and {} strings skipped",
        report.queued.len(),
        report.translated,
        report.comments.len(),
        report.strings.len()
    );
    for phrase in &report.queued {
        match cache.get(phrase) {
            Some(translation) => println!("   \"{}\" → \"{}\"", phrase, translation),
            None => println!("   \"{}\" → (no translation)", phrase),
        }
    }

    Ok(())
}
