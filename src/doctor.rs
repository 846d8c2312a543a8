//! Diagnostic tool for hostswap.
//!
//! Implements `hostswap doctor`, which checks:
//! - the profiles directory and config file,
//! - that the live hosts file exists and can be written,
//! - duplicate domains in the live file (loaded as-is, never repaired),
//! - that every profile is readable and which one is current.
//!
//! Diagnostics never write anything, including the `default` profile that
//! `list_profiles` would synthesize.

use anstyle::AnsiColor;
use std::env;
use std::fs;

use crate::config::Config;
use crate::document::HostDocument;
use crate::paths::{PROFILE_EXTENSION, Paths};
use crate::profiles::{ProfileStore, is_current, validate_profile_name};
use crate::ui::Ui;

/// Run the doctor diagnostics. Returns `true` when no check failed.
pub fn run_doctor(paths: &Paths, store: &ProfileStore, ui: &Ui) -> bool {
    ui.section("hostswap Doctor");
    ui.newline();

    let mut healthy = true;

    healthy &= check_step(ui, "Directories", || {
        if paths.profiles_dir.is_dir() {
            ui.println(format!(
                "  {} Profiles directory exists: {}",
                ui.icon_ok(),
                paths.profiles_dir.display()
            ));
        } else {
            ui.println(format!(
                "  {} Profiles directory missing: {}",
                ui.icon_warn(),
                paths.profiles_dir.display()
            ));
        }
        true
    });

    healthy &= check_step(ui, "Config File", || match Config::read(&paths.config_file) {
        Ok(_) if paths.config_file.exists() => {
            ui.println(format!(
                "  {} Config readable: {}",
                ui.icon_ok(),
                paths.config_file.display()
            ));
            true
        }
        Ok(_) => {
            ui.println(format!("  {} No config file, using defaults", ui.icon_info()));
            true
        }
        Err(e) => {
            ui.println(format!("  {} Config file corrupt: {:#}", ui.icon_err(), e));
            false
        }
    });

    healthy &= check_step(ui, "Hosts File", || {
        let hosts = store.hosts_file();
        if !hosts.is_file() {
            ui.println(format!("  {} Hosts file missing: {}", ui.icon_err(), hosts.display()));
            return false;
        }
        ui.println(format!("  {} Hosts file: {}", ui.icon_ok(), hosts.display()));

        let mut ok = true;
        match store.check_live_access() {
            Ok(()) => ui.println(format!("  {} Writable by this user", ui.icon_ok())),
            Err(_) => ui.println(format!(
                "  {} Not writable by this user (add/remove/use need elevated privileges)",
                ui.icon_warn()
            )),
        }

        match HostDocument::load(hosts) {
            Ok(doc) => {
                ui.println(format!(
                    "  {} {} mapping(s), {} line(s)",
                    ui.icon_info(),
                    doc.mappings().count(),
                    doc.len()
                ));
                let duplicates = doc.duplicate_domains();
                if !duplicates.is_empty() {
                    ui.println(format!(
                        "  {} Domains mapped more than once (first entry wins): {}",
                        ui.icon_warn(),
                        duplicates.join(", ")
                    ));
                }
            }
            Err(e) => {
                ui.println(format!("  {} {}", ui.icon_err(), e));
                ok = false;
            }
        }
        ok
    });

    healthy &= check_step(ui, "Profiles", || {
        let Ok(entries) = fs::read_dir(store.profiles_dir()) else {
            ui.println(format!("  {} No profiles found", ui.icon_warn()));
            return true;
        };
        let live = fs::read(store.hosts_file()).unwrap_or_default();

        let mut files: Vec<_> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                p.is_file() && p.extension().and_then(|e| e.to_str()) == Some(PROFILE_EXTENSION)
            })
            .collect();
        files.sort();

        if files.is_empty() {
            ui.println(format!("  {} No profiles found", ui.icon_warn()));
            return true;
        }

        ui.println(format!("  Found {} profile(s):", files.len()));
        let mut all_valid = true;
        let mut any_current = false;

        for path in files {
            let name = path
                .file_stem()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            match fs::read(&path) {
                Ok(content) => {
                    let current = is_current(&content, &live);
                    any_current |= current;
                    let mut notes = Vec::new();
                    if current {
                        notes.push("current");
                    }
                    if validate_profile_name(&name).is_err() {
                        notes.push("skipped, name not usable from the CLI");
                    }
                    if std::str::from_utf8(&content).is_err() {
                        notes.push("not valid UTF-8");
                    }

                    let icon = if notes.iter().any(|n| *n != "current") {
                        ui.icon_warn()
                    } else {
                        ui.icon_ok()
                    };
                    if notes.is_empty() {
                        ui.println(format!("    {} {}", icon, name));
                    } else {
                        ui.println(format!("    {} {} ({})", icon, name, notes.join(", ")));
                    }
                }
                Err(e) => {
                    ui.println(format!("    {} {} (unreadable: {})", ui.icon_err(), name, e));
                    all_valid = false;
                }
            }
        }

        if !any_current {
            ui.println(format!(
                "  {} No profile matches the live hosts file; `hostswap profiles` will save it as 'default'",
                ui.icon_info()
            ));
        }
        all_valid
    });

    check_step(ui, "Environment", || {
        match env::var("EDITOR") {
            Ok(e) => ui.println(format!("  {} EDITOR set to: {}", ui.icon_ok(), e)),
            Err(_) => ui.println(format!("  {} EDITOR not set (using system default)", ui.icon_info())),
        }
        true
    });

    healthy
}

fn check_step<F>(ui: &Ui, name: &str, check_fn: F) -> bool
where
    F: FnOnce() -> bool,
{
    ui.println(ui.bold(format!("Checking {}...", name)));
    let success = check_fn();
    if !success {
        ui.println(ui.colored("  Issues detected!", AnsiColor::Red));
    }
    ui.newline();
    success
}
