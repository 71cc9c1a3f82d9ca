mod app;

use app::DoodlePadApp;
use doodlepad::cli;
use doodlepad::logger;
use eframe::egui;

fn main() -> Result<(), eframe::Error> {
    // -- CLI / headless mode ---------------------------------------------
    if cli::CliArgs::is_cli_mode() {
        use clap::Parser;
        let args = cli::CliArgs::parse();
        let code = cli::run(args);
        std::process::exit(if code == std::process::ExitCode::SUCCESS {
            0
        } else {
            1
        });
    }

    // -- GUI mode -----------------------------------------------------

    // Initialize session log (overwrites previous session log)
    logger::init();

    let settings = doodlepad::PadSettings::load();
    // First run: write the defaults out so there is a file to edit
    if doodlepad::PadSettings::settings_path().is_some_and(|p| !p.exists()) {
        settings.save();
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 860.0])
            .with_title("DoodlePad"),
        ..Default::default()
    };

    eframe::run_native(
        "DoodlePad",
        options,
        Box::new(move |cc| Box::new(DoodlePadApp::new(cc, settings))),
    )
}
