//! High-level command orchestration for the CLI.
//!
//! Each function here corresponds to a subcommand in `main.rs`. Handlers
//! talk to the user through `crate::ui` and to disk only through
//! `crate::profiles::ProfileStore`; every call starts from a fresh read.
//!
//! Mapping commands (`list`, `add`, `remove`) act on the live hosts file
//! unless a profile name is given.

use anstyle::AnsiColor;
use anyhow::{Context, Result, bail};
use chrono::Local;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::doctor::run_doctor;
use crate::document::HostDocument;
use crate::paths::Paths;
use crate::profiles::{ProfileListing, ProfileStore};
use crate::ui::Ui;

fn require_live_file(store: &ProfileStore) -> Result<()> {
    if !store.hosts_file().is_file() {
        bail!(
            "Hosts file not found: {}\nHint: Set HOSTSWAP_HOSTS_FILE or \"hosts_file\" in the config to point at it.",
            store.hosts_file().display()
        );
    }
    Ok(())
}

/// Precondition for commands that rewrite the live hosts file
fn require_live_write_access(store: &ProfileStore) -> Result<()> {
    require_live_file(store)?;
    store.check_live_access().with_context(|| {
        format!(
            "Cannot modify {}; re-run as root/administrator",
            store.hosts_file().display()
        )
    })
}

fn require_profile(listing: &ProfileListing, name: &str) -> Result<()> {
    if !listing.contains(name) {
        bail!(
            "Profile '{}' does not exist.\nHint: Use 'hostswap profiles' to see available profiles.",
            name
        );
    }
    Ok(())
}

/// Load the document a mapping command operates on, with the path to save it back to.
fn load_target(store: &ProfileStore, profile: Option<&str>) -> Result<(HostDocument, PathBuf)> {
    match profile {
        Some(name) => {
            let doc = store.load_profile(name)?;
            Ok((doc, store.profile_path(name)))
        }
        None => {
            require_live_file(store)?;
            Ok((store.load_live()?, store.hosts_file().to_path_buf()))
        }
    }
}

fn after_profile_edit(ui: &Ui, profile: Option<&str>) {
    if let Some(name) = profile {
        ui.info(format!(
            "Saved profile '{}'. Run 'hostswap use {}' to apply it.",
            name, name
        ));
    }
}

/// Print every mapping as `ip domain`, comments suppressed
pub fn list(store: &ProfileStore, profile: Option<&str>, json: bool, ui: &Ui) -> Result<()> {
    let (doc, _) = load_target(store, profile)?;

    if json {
        let mappings: Vec<_> = doc.mappings().collect();
        ui.println(serde_json::to_string_pretty(&mappings)?);
        return Ok(());
    }

    for mapping in doc.mappings() {
        ui.println(mapping.to_string());
    }
    Ok(())
}

/// Add a mapping and write the file back
pub fn add(
    store: &ProfileStore,
    ip: &str,
    domain: &str,
    profile: Option<&str>,
    ui: &Ui,
) -> Result<()> {
    if profile.is_none() {
        require_live_write_access(store)?;
    }
    let (mut doc, path) = load_target(store, profile)?;

    doc.add_mapping(ip, domain)?;
    store.save_document(&doc, &path)?;

    ui.ok(format!("Added {} {}", ip, domain));
    after_profile_edit(ui, profile);
    Ok(())
}

/// Remove the mapping for a domain and write the file back
pub fn remove(store: &ProfileStore, domain: &str, profile: Option<&str>, ui: &Ui) -> Result<()> {
    if profile.is_none() {
        require_live_write_access(store)?;
    }
    let (mut doc, path) = load_target(store, profile)?;

    let removed = doc.remove_mapping(domain)?;
    store.save_document(&doc, &path)?;

    ui.ok(format!("Removed {}", removed));
    after_profile_edit(ui, profile);
    Ok(())
}

/// List all saved profiles, marking the current one(s)
pub fn profiles(store: &ProfileStore, json: bool, ui: &Ui) -> Result<()> {
    let listing = store.list_profiles()?;

    if json {
        ui.println(serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    if listing.is_empty() {
        ui.warn("No profiles found.");
        ui.newline();
        ui.println("Create one with:");
        ui.println(format!("  {} new <name>", ui.bold("hostswap")));
        return Ok(());
    }

    let mut table = ui.simple_table();
    table.set_header(vec![
        ui.header_cell(""),
        ui.header_cell("Profile"),
        ui.header_cell("Mappings"),
        ui.header_cell("Status"),
    ]);

    for profile in &listing {
        let icon = if profile.is_current { ui.icon_ok() } else { " " };
        let status_cell = if profile.is_current {
            ui.colored_cell("current", AnsiColor::Green)
        } else {
            ui.cell("-")
        };
        let mappings = match HostDocument::load(&profile.path) {
            Ok(doc) => doc.mappings().count().to_string(),
            Err(_) => String::from("?"),
        };

        table.add_row(vec![
            ui.cell(icon),
            ui.cell(&profile.name),
            ui.cell(mappings),
            status_cell,
        ]);
    }

    ui.section("Profiles");
    ui.println(table.to_string());
    Ok(())
}

/// Activate a profile by copying it over the live hosts file
pub fn use_profile(store: &ProfileStore, name: &str, ui: &Ui) -> Result<()> {
    require_live_write_access(store)?;
    let mut listing = store.list_profiles()?;
    require_profile(&listing, name)?;

    let spinner = ui.spinner(format!("Switching to profile '{}'...", name));

    match store.activate_profile(&mut listing, name) {
        Ok(()) => {
            ui.spinner_finish_ok(&spinner, format!("Active profile: {}", name));
            Ok(())
        }
        Err(e) => {
            ui.spinner_finish_err(&spinner, "Failed to switch");
            Err(e.into())
        }
    }
}

/// Save the live hosts file as a named profile
pub fn save(store: &ProfileStore, name: &str, force: bool, ui: &Ui) -> Result<()> {
    require_live_file(store)?;
    let mut listing = store.list_profiles()?;

    store.save_live_as(&mut listing, name, force)?;

    ui.ok(format!("Saved live hosts file as profile '{}'", name));
    Ok(())
}

/// Copy a profile under a new name
pub fn copy(store: &ProfileStore, source: &str, new_name: &str, ui: &Ui) -> Result<()> {
    let mut listing = store.list_profiles()?;
    require_profile(&listing, source)?;

    store.copy_profile(&mut listing, source, new_name)?;

    ui.ok(format!("Copied '{}' to '{}'", source, new_name));
    Ok(())
}

/// Create an empty profile holding only a creation note
pub fn new_profile(store: &ProfileStore, name: &str, note: Option<&str>, ui: &Ui) -> Result<()> {
    let mut listing = store.list_profiles()?;
    let note = match note {
        Some(n) => n.to_string(),
        None => format!(
            "hosts profile created at {}",
            Local::now().format("%Y-%m-%d %H:%M:%S")
        ),
    };

    store.new_profile(&mut listing, name, &note)?;

    ui.ok(format!("Created profile '{}'", name));
    ui.newline();
    ui.println("Add mappings with:");
    ui.println(format!("  hostswap add <ip> <domain> --profile {}", name));
    Ok(())
}

/// Delete a profile, asking first unless `force`
pub fn delete(store: &ProfileStore, name: &str, force: bool, ui: &Ui) -> Result<()> {
    let mut listing = store.list_profiles()?;
    require_profile(&listing, name)?;

    if !force {
        let confirm = inquire::Confirm::new(&format!("Delete profile '{}'?", name))
            .with_default(false)
            .with_help_message("The profile file is removed; the live hosts file is not touched")
            .prompt()
            .context("Confirmation cancelled")?;

        if !confirm {
            ui.warn("Deletion cancelled.");
            return Ok(());
        }
    }

    let removed = store.delete_profile(&mut listing, name)?;

    ui.ok(format!("Deleted profile '{}'", name));
    if removed.is_current {
        ui.info("It matched the live hosts file; the next listing will save that content as 'default'.");
    }
    Ok(())
}

/// Print a profile's content, comments dimmed
pub fn show(store: &ProfileStore, name: &str, ui: &Ui) -> Result<()> {
    let listing = store.list_profiles()?;
    require_profile(&listing, name)?;
    let doc = store.load_profile(name)?;

    let current = listing.get(name).is_some_and(|p| p.is_current);
    let title = if current {
        format!("Profile: {} {}", name, ui.colored("(current)", AnsiColor::Green))
    } else {
        format!("Profile: {}", name)
    };
    ui.section(title);
    ui.newline();

    for entry in doc.entries() {
        if entry.is_comment() {
            ui.println(ui.dim(entry.to_string()));
        } else {
            ui.println(entry.to_string());
        }
    }
    Ok(())
}

/// Open a profile file in the user's editor
pub fn edit(store: &ProfileStore, name: &str, ui: &Ui) -> Result<()> {
    let listing = store.list_profiles()?;
    require_profile(&listing, name)?;

    let path = store.profile_path(name);
    open_in_editor(&path)?;

    ui.ok(format!("Opened {} in editor", path.display()));
    Ok(())
}

/// Open a file in $EDITOR, falling back to the platform's default editor
fn open_in_editor(path: &Path) -> Result<()> {
    let editor = std::env::var("EDITOR").ok();
    let (program, args): (String, Vec<&str>) = match editor.as_deref() {
        Some(e) if !e.trim().is_empty() => (e.to_string(), vec![]),
        _ if cfg!(windows) => ("notepad".to_string(), vec![]),
        _ if cfg!(target_os = "macos") => ("open".to_string(), vec!["-t"]),
        _ => ("vi".to_string(), vec![]),
    };

    let status = Command::new(&program)
        .args(&args)
        .arg(path)
        .status()
        .with_context(|| format!("Failed to run editor: {}", program))?;

    if !status.success() {
        bail!("Editor exited with non-zero status");
    }
    Ok(())
}

/// Run diagnostics
pub fn doctor(paths: &Paths, store: &ProfileStore, ui: &Ui) -> Result<()> {
    if !run_doctor(paths, store, ui) {
        bail!("Doctor found problems");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HostsError;
    use crate::profiles::DEFAULT_PROFILE;
    use crate::test_utils::{DenyingWriter, setup_test_paths, setup_test_store};
    use crate::ui::ColorMode;
    use std::fs;
    use tempfile::TempDir;

    fn test_ui() -> Ui {
        Ui::new(ColorMode::Never, false)
    }

    #[test]
    fn test_list_missing_hosts_file() {
        let temp_dir = TempDir::new().unwrap();
        let paths = setup_test_paths(&temp_dir);
        let store = setup_test_store(&paths);

        let err = list(&store, None, false, &test_ui()).unwrap_err();
        assert!(err.to_string().contains("Hosts file not found"));
    }

    #[test]
    fn test_add_and_remove_live() {
        let temp_dir = TempDir::new().unwrap();
        let paths = setup_test_paths(&temp_dir);
        let store = setup_test_store(&paths);
        let ui = test_ui();
        fs::write(&paths.hosts_file, "# h\n10.0.0.1 a.test\n").unwrap();

        add(&store, "10.0.0.2", "b.test", None, &ui).unwrap();
        assert_eq!(
            fs::read_to_string(&paths.hosts_file).unwrap(),
            "# h\n10.0.0.1 a.test\n10.0.0.2 b.test\n"
        );

        remove(&store, "a.test", None, &ui).unwrap();
        assert_eq!(
            fs::read_to_string(&paths.hosts_file).unwrap(),
            "# h\n10.0.0.2 b.test\n"
        );
    }

    #[test]
    fn test_add_duplicate_domain() {
        let temp_dir = TempDir::new().unwrap();
        let paths = setup_test_paths(&temp_dir);
        let store = setup_test_store(&paths);
        fs::write(&paths.hosts_file, "10.0.0.1 a.test\n").unwrap();

        let err = add(&store, "10.0.0.9", "a.test", None, &test_ui()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<HostsError>(),
            Some(&HostsError::DuplicateDomain("a.test".to_string()))
        );
        assert_eq!(fs::read_to_string(&paths.hosts_file).unwrap(), "10.0.0.1 a.test\n");
    }

    #[test]
    fn test_remove_missing_domain() {
        let temp_dir = TempDir::new().unwrap();
        let paths = setup_test_paths(&temp_dir);
        let store = setup_test_store(&paths);
        fs::write(&paths.hosts_file, "10.0.0.1 a.test\n").unwrap();

        let err = remove(&store, "missing.test", None, &test_ui()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<HostsError>(),
            Some(&HostsError::NotFound("missing.test".to_string()))
        );
    }

    #[test]
    fn test_add_without_write_access() {
        let temp_dir = TempDir::new().unwrap();
        let paths = setup_test_paths(&temp_dir);
        fs::write(&paths.hosts_file, "10.0.0.1 a.test\n").unwrap();
        let store = ProfileStore::new(
            &paths.profiles_dir,
            &paths.hosts_file,
            Box::new(DenyingWriter),
        );

        let err = add(&store, "10.0.0.2", "b.test", None, &test_ui()).unwrap_err();
        assert!(format!("{:#}", err).contains("permission denied"));
        assert_eq!(fs::read_to_string(&paths.hosts_file).unwrap(), "10.0.0.1 a.test\n");
    }

    #[test]
    fn test_add_to_profile_leaves_live_file() {
        let temp_dir = TempDir::new().unwrap();
        let paths = setup_test_paths(&temp_dir);
        let store = setup_test_store(&paths);
        let ui = test_ui();
        fs::write(&paths.hosts_file, "10.0.0.1 a.test\n").unwrap();

        new_profile(&store, "dev", Some("dev box"), &ui).unwrap();
        add(&store, "127.0.0.1", "api.test", Some("dev"), &ui).unwrap();

        assert_eq!(
            fs::read_to_string(paths.profile_file("dev")).unwrap(),
            "# dev box\n127.0.0.1 api.test\n"
        );
        assert_eq!(fs::read_to_string(&paths.hosts_file).unwrap(), "10.0.0.1 a.test\n");

        assert!(add(&store, "1.1.1.1", "x.test", Some("ghost"), &ui).is_err());
    }

    #[test]
    fn test_profile_lifecycle() {
        let temp_dir = TempDir::new().unwrap();
        let paths = setup_test_paths(&temp_dir);
        let store = setup_test_store(&paths);
        let ui = test_ui();
        fs::write(&paths.hosts_file, "127.0.0.1 localhost\n").unwrap();

        profiles(&store, false, &ui).unwrap();
        assert!(paths.profile_file(DEFAULT_PROFILE).exists());

        copy(&store, DEFAULT_PROFILE, "work", &ui).unwrap();
        add(&store, "10.1.0.1", "intranet.test", Some("work"), &ui).unwrap();
        show(&store, "work", &ui).unwrap();

        use_profile(&store, "work", &ui).unwrap();
        assert_eq!(
            fs::read_to_string(&paths.hosts_file).unwrap(),
            "127.0.0.1 localhost\n10.1.0.1 intranet.test\n"
        );
        let listing = store.list_profiles().unwrap();
        assert!(listing.get("work").unwrap().is_current);
        assert!(!listing.get(DEFAULT_PROFILE).unwrap().is_current);

        delete(&store, DEFAULT_PROFILE, true, &ui).unwrap();
        assert!(!paths.profile_file(DEFAULT_PROFILE).exists());
    }

    #[test]
    fn test_save_live_as_profile() {
        let temp_dir = TempDir::new().unwrap();
        let paths = setup_test_paths(&temp_dir);
        let store = setup_test_store(&paths);
        let ui = test_ui();
        let live = "127.0.0.1   localhost\n::1 localhost ip6-localhost\n";
        fs::write(&paths.hosts_file, live).unwrap();

        save(&store, "snap", false, &ui).unwrap();
        assert!(save(&store, "snap", false, &ui).is_err());
        save(&store, "snap", true, &ui).unwrap();
        assert_eq!(fs::read_to_string(paths.profile_file("snap")).unwrap(), live);
        assert!(store.list_profiles().unwrap().get("snap").unwrap().is_current);
    }

    #[test]
    fn test_use_unknown_profile() {
        let temp_dir = TempDir::new().unwrap();
        let paths = setup_test_paths(&temp_dir);
        let store = setup_test_store(&paths);
        fs::write(&paths.hosts_file, "10.0.0.1 a.test\n").unwrap();

        let err = use_profile(&store, "nonexistent", &test_ui()).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_new_duplicate_profile() {
        let temp_dir = TempDir::new().unwrap();
        let paths = setup_test_paths(&temp_dir);
        let store = setup_test_store(&paths);
        let ui = test_ui();

        new_profile(&store, "dup", None, &ui).unwrap();
        let err = new_profile(&store, "dup", None, &ui).unwrap_err();
        assert_eq!(
            err.downcast_ref::<HostsError>(),
            Some(&HostsError::AlreadyExists("dup".to_string()))
        );
        assert!(
            fs::read_to_string(paths.profile_file("dup"))
                .unwrap()
                .starts_with("# hosts profile created at ")
        );
    }
}
