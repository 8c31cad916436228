use tauri::{Manager, RunEvent};

#[cfg(desktop)]
use tauri_plugin_autostart::MacosLauncher;

pub mod app;
mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod notice;

use app::ShellAction;

/// Passed by the login item; start with only the tray icon.
pub const MINIMIZED_FLAG: &str = "--minimized";

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    // Single-instance must be registered first so a second launch exits
    // before any other plugin touches shared state.
    let mut builder = tauri::Builder::default().plugin(tauri_plugin_single_instance::init(
        |app, _argv, _cwd| {
            log::info!("[SHELL] Activated by another instance");
            app::perform(app, ShellAction::ShowWindow);
        },
    ));

    builder = builder
        .plugin(tauri_plugin_store::Builder::default().build())
        .plugin(tauri_plugin_dialog::init())
        .plugin(tauri_plugin_opener::init())
        .plugin(
            tauri_plugin_window_state::Builder::default()
                .with_state_flags(app::window::window_state_flags())
                .build(),
        );

    #[cfg(desktop)]
    {
        builder = builder
            .plugin(
                tauri_plugin_global_shortcut::Builder::new()
                    .with_handler(|app, shortcut, event| {
                        app::shortcuts::handle(app, shortcut, event)
                    })
                    .build(),
            )
            .plugin(tauri_plugin_autostart::init(
                MacosLauncher::LaunchAgent,
                Some(vec![MINIMIZED_FLAG]),
            ));
    }

    let app = builder
        .on_window_event(app::events::handle_window_event)
        .invoke_handler(tauri::generate_handler![
            // Preferences window
            commands::settings::get_preferences,
            commands::settings::set_customization_enabled,
            commands::settings::save_stylesheet_directory,
            commands::settings::pick_stylesheet_directory,
            commands::settings::reveal_stylesheet_directory,
            commands::settings::get_shortcuts,
            commands::settings::set_shortcut,
            commands::settings::set_autostart,
            commands::settings::is_autostart_enabled,
            // Logging
            commands::logging::write_log,
            commands::logging::get_log_dir,
            commands::logging::get_recent_logs,
        ])
        .setup(|app| {
            if let Err(e) = commands::logging::init_logging(app.handle()) {
                eprintln!("Failed to initialize logging: {}", e);
            }

            // Tray-only app: no Dock icon, no app switcher entry.
            #[cfg(target_os = "macos")]
            app.set_activation_policy(tauri::ActivationPolicy::Accessory);

            let state = app::init_state(app.handle());
            app.manage(state);

            #[cfg(desktop)]
            {
                app::tray::init(app)?;
                app::shortcuts::register_all(app.handle());
            }

            if std::env::args().any(|arg| arg == MINIMIZED_FLAG) {
                log::info!("[SHELL] Started minimized");
            } else {
                app::perform(app.handle(), ShellAction::ShowWindow);
            }

            Ok(())
        })
        .build(tauri::generate_context!())
        .expect("error while building tauri application");

    app.run(|_app, event| {
        // Closing the preferences window must not quit a tray app whose
        // main window was never opened.
        if let RunEvent::ExitRequested { code: None, api, .. } = event {
            api.prevent_exit();
        }
    });
}
