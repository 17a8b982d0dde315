//! Profile management commands.
//!
//! parley keeps each chat login in a Chrome profile under
//! `~/.parley/profiles/<name>`. These commands let you:
//! - List profiles with their size
//! - Inspect one profile (size, creation date, whether cookies are stored)
//! - Delete a profile, which logs you out of the chat site
//!
//! # Examples
//!
//! ```bash
//! # List all profiles
//! parley profile list
//!
//! # Show profile details
//! parley profile info default
//!
//! # Delete a profile
//! parley profile delete work
//! ```

use anyhow::{Result, anyhow};
use parley_browser::{DEFAULT_PROFILE, ProfileManager};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

/// Name, path and size of every profile directory, sorted by name
pub fn collect_profiles() -> Result<Vec<(String, PathBuf, u64)>> {
    let profiles_dir = ProfileManager::profiles_dir()?;
    let mut profiles = Vec::new();

    if !profiles_dir.exists() {
        return Ok(profiles);
    }

    for entry in fs::read_dir(&profiles_dir)? {
        let path = entry?.path();
        if !path.is_dir() {
            continue;
        }

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| anyhow!("Invalid profile name"))?
            .to_string();
        let size = ProfileManager::persistent(path.clone())?.size().unwrap_or(0);

        profiles.push((name, path, size));
    }

    profiles.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(profiles)
}

/// List all available profiles
pub fn list() -> Result<()> {
    let profiles = collect_profiles()?;

    if profiles.is_empty() {
        println!(
            "No profiles found. Profiles will be created in: {}",
            ProfileManager::profiles_dir()?.display()
        );
        return Ok(());
    }

    println!("Available profiles:");
    println!();

    for (name, path, size) in profiles {
        let marker = if name == DEFAULT_PROFILE { "* " } else { "  " };
        println!(
            "{}{:<20} {:>8.1} MB    {}",
            marker,
            name,
            size as f64 / 1_048_576.0,
            path.display()
        );
    }

    Ok(())
}

/// Show detailed information about a profile
pub fn info(name: &str) -> Result<()> {
    let profile_path = ProfileManager::named_path(name)?;

    if !profile_path.exists() {
        return Err(anyhow!("Profile '{}' not found", name));
    }

    let profile = ProfileManager::persistent(profile_path.clone())?;
    let size = profile.size()?;

    let created = fs::metadata(&profile_path)?.created().ok().and_then(|time| {
        let duration = time.duration_since(std::time::UNIX_EPOCH).ok()?;
        Some(
            chrono::DateTime::from_timestamp(duration.as_secs() as i64, 0)?
                .format("%Y-%m-%d")
                .to_string(),
        )
    });

    println!("Profile: {}", name);
    println!("Path: {}", profile_path.display());
    println!("Size: {:.1} MB ({} bytes)", size as f64 / 1_048_576.0, size);
    if let Some(created_date) = created {
        println!("Created: {}", created_date);
    }
    println!(
        "Saved login: {}",
        if profile.has_cookies() { "Likely (cookies present)" } else { "No" }
    );

    Ok(())
}

/// Delete a profile
pub fn delete(name: &str, force: bool) -> Result<()> {
    let profile_path = ProfileManager::named_path(name)?;

    if !profile_path.exists() {
        return Err(anyhow!("Profile '{}' not found", name));
    }

    if name == DEFAULT_PROFILE && !force {
        return Err(anyhow!(
            "Cannot delete '{}' profile without --force flag.\n\
             The default profile is used when no profile is specified.\n\
             Use: parley profile delete {} --force",
            DEFAULT_PROFILE,
            DEFAULT_PROFILE
        ));
    }

    if !force {
        print!(
            "⚠️  This will permanently delete profile '{}' and its saved login.\nType '{}' to confirm: ",
            name, name
        );
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        if input.trim() != name {
            println!("Deletion cancelled.");
            return Ok(());
        }
    }

    fs::remove_dir_all(&profile_path)?;
    println!("✅ Profile '{}' deleted", name);

    Ok(())
}
