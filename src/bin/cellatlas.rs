use cellatlas::{about, app};
use eframe::{NativeOptions, egui};
use std::env;

#[cfg(target_os = "macos")]
fn configure_macos_process_name() {
    use objc2_foundation::{NSProcessInfo, ns_string};
    // Winit builds the macOS app menu title from NSProcessInfo::processName.
    // Set it early so the native menu shows "About CellAtlas" instead of
    // "About cellatlas".
    unsafe {
        NSProcessInfo::processInfo().setProcessName(ns_string!("CellAtlas"));
    }
}

#[cfg(not(target_os = "macos"))]
fn configure_macos_process_name() {}

fn main() -> eframe::Result<()> {
    configure_macos_process_name();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.iter().any(|a| a == "--version" || a == "-V") {
        println!("{}", about::version_cli_text());
        return Ok(());
    }
    // --seed N makes the simulated cell table reproducible.
    let seed = args
        .iter()
        .position(|a| a == "--seed")
        .and_then(|i| args.get(i + 1))
        .and_then(|v| v.parse::<u64>().ok());

    let options = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([640.0, 440.0]),
        ..Default::default()
    };

    eframe::run_native(
        "CellAtlas",
        options,
        Box::new(move |_cc| {
            Ok(Box::new(match seed {
                Some(seed) => app::AtlasApp::new_seeded(seed),
                None => app::AtlasApp::new(),
            }))
        }),
    )
}
