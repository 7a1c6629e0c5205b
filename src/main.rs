use env_logger::Env;

use scanline::AppConfig;

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env();
    log::info!(
        "starting {} at {}x{}{}",
        config.title,
        config.width,
        config.height,
        if config.skip_intro { " (intro skipped)" } else { "" }
    );

    if let Err(e) = scanline::run(config) {
        log::error!("{e}");
        std::process::exit(1);
    }
}
