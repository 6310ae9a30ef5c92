use crate::config::Profile;
use anyhow::Result;
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

pub struct ProfileLoader;

impl ProfileLoader {
    /// Loads a profile by merging a TOML file with `BOTSYNC_`-prefixed
    /// environment variables, so credentials can stay out of the file
    /// (`BOTSYNC_API.KEY`, `BOTSYNC_API.SECRET`).
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Profile> {
        let profile: Profile = Figment::new()
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("BOTSYNC_").split("."))
            .extract()?;

        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn load_reads_toml_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"
            id = "prof-1"
            name = "main"
            currency_filter = ["USDT"]

            [api]
            key = "k"
            secret = "s"
            "#
        )
        .expect("write");

        let profile = ProfileLoader::load(file.path()).expect("loads");
        assert_eq!(profile.id, "prof-1");
        assert_eq!(profile.currency_filter, vec!["USDT"]);
        assert!(profile.has_credentials());
    }

    #[test]
    fn load_missing_file_fails_on_missing_id() {
        // Figment treats a missing file as an empty source, so extraction
        // fails on the required `id` field.
        let result = ProfileLoader::load("/nonexistent/profile.toml");
        assert!(result.is_err());
    }
}
