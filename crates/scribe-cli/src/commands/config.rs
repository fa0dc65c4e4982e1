use std::env;

use scribe_core::config::{is_http_url, normalize_text_option};

use crate::cli::ConfigCommands;
use crate::config_profiles::{CliProfile, CliProfilesConfig};
use crate::error::CliError;

pub fn run_config(command: ConfigCommands, global_profile: Option<&str>) -> Result<(), CliError> {
    match command {
        ConfigCommands::Init {
            profile,
            supabase_url,
            supabase_anon_key,
            no_activate,
        } => run_config_init(
            profile.as_deref().or(global_profile),
            supabase_url,
            supabase_anon_key,
            no_activate,
        ),
    }
}

pub fn run_config_init(
    profile_name: Option<&str>,
    supabase_url: Option<String>,
    supabase_anon_key: Option<String>,
    no_activate: bool,
) -> Result<(), CliError> {
    let mut config = CliProfilesConfig::load().map_err(CliError::Config)?;
    let profile_name = init_profile(
        &mut config,
        profile_name,
        supabase_url.or_else(|| env::var("SUPABASE_URL").ok()),
        supabase_anon_key.or_else(|| env::var("SUPABASE_ANON_KEY").ok()),
        no_activate,
    )?;

    let path = config.save().map_err(CliError::Config)?;
    println!(
        "Profile '{}' initialized at {}",
        profile_name,
        path.display()
    );

    let missing_fields = config
        .profile(&profile_name)
        .map(CliProfile::missing_fields)
        .unwrap_or_default();
    if missing_fields.is_empty() {
        println!(
            "Profile '{profile_name}' is ready. Run `scribe auth login --email <email> --password <password>`."
        );
    } else {
        println!(
            "Profile '{}' is missing: {}",
            profile_name,
            missing_fields.join(", ")
        );
    }

    Ok(())
}

/// Merge explicit values into the named profile, keeping existing values
/// for anything not given. Returns the resolved profile name.
pub fn init_profile(
    config: &mut CliProfilesConfig,
    profile_name: Option<&str>,
    supabase_url: Option<String>,
    supabase_anon_key: Option<String>,
    no_activate: bool,
) -> Result<String, CliError> {
    let profile_name = config.resolve_profile_name(profile_name);

    let profile = config.profile_mut_or_default(&profile_name);
    if let Some(value) = normalize_text_option(supabase_url) {
        profile.supabase_url = Some(value.trim_end_matches('/').to_string());
    }
    if let Some(value) = normalize_text_option(supabase_anon_key) {
        profile.supabase_anon_key = Some(value);
    }
    validate_profile_urls(profile)?;

    if !no_activate {
        config.active_profile = Some(profile_name.clone());
    }
    Ok(profile_name)
}

fn validate_profile_urls(profile: &CliProfile) -> Result<(), CliError> {
    if let Some(url) = profile.supabase_url() {
        if !is_http_url(&url) {
            return Err(CliError::Config(
                "supabase_url must include http:// or https://".to_string(),
            ));
        }
    }
    Ok(())
}
