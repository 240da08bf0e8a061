use config::Config;
use std::path::Path;

/// Trait for parsing the configuration value.
///
/// # Parameters
/// * `Self` - Type of the configuration value.
pub trait ConfigValue: Sized {
    /// Parse the configuration value.
    ///
    /// # Parameters
    /// * `s` - String to parse.
    ///
    /// # Returns
    /// The parsed configuration value.
    fn parse_value(s: &str) -> Self;
}

/// Implement the trait ConfigValue for String.
impl ConfigValue for String {
    fn parse_value(s: &str) -> Self {
        s.to_string()
    }
}

/// Implement the trait ConfigValue for f64.
impl ConfigValue for f64 {
    fn parse_value(s: &str) -> Self {
        s.parse::<f64>().expect(&format!("{s} should parse as f64"))
    }
}

/// Implement the trait ConfigValue for f32.
impl ConfigValue for f32 {
    fn parse_value(s: &str) -> Self {
        s.parse::<f32>().expect(&format!("{s} should parse as f32"))
    }
}

/// Implement the trait ConfigValue for usize.
impl ConfigValue for usize {
    fn parse_value(s: &str) -> Self {
        s.parse::<usize>()
            .expect(&format!("{s} should parse as usize"))
    }
}

/// Implement the trait ConfigValue for u8.
impl ConfigValue for u8 {
    fn parse_value(s: &str) -> Self {
        s.parse::<u8>().expect(&format!("{s} should parse as u8"))
    }
}

/// Implement the trait ConfigValue for u16.
impl ConfigValue for u16 {
    fn parse_value(s: &str) -> Self {
        s.parse::<u16>().expect(&format!("{s} should parse as u16"))
    }
}

/// Implement the trait ConfigValue for bool.
impl ConfigValue for bool {
    fn parse_value(s: &str) -> Self {
        s.parse::<bool>()
            .expect(&format!("{s} should parse as bool"))
    }
}

/// Get the configuation from the file.
///
/// # Parameters
/// * `filepath` - Path to the config file.
///
/// # Returns
/// The configuration.
pub fn get_config(filepath: &Path) -> Config {
    let name = filepath
        .to_str()
        .expect(&format!("Should have the file name in the {:?}", filepath));

    Config::builder()
        .add_source(config::File::with_name(name))
        .build()
        .expect(&format!("Should be able to read the {name}"))
}

/// Get the parameter from the file.
///
/// # Parameters
/// * `filepath` - Path to the config file.
/// * `key` - Key to find the parameter in the config file.
///
/// # Returns
/// The parameter.
pub fn get_parameter<T: ConfigValue>(filepath: &Path, key: &str) -> T {
    let config = get_config(filepath);

    config
        .get_string(key)
        .map(|v| T::parse_value(&v))
        .expect(&format!("Should find the {key} in the {:?}", filepath))
}

/// Get the array parameter from the file.
///
/// # Parameters
/// * `filepath` - Path to the config file.
/// * `key` - Key to find the parameter in the config file.
///
/// # Returns
/// The array parameter.
pub fn get_parameter_array<T: ConfigValue>(filepath: &Path, key: &str) -> Vec<T> {
    let config = get_config(filepath);
    let config_array = config
        .get_array(key)
        .expect(&format!("Should find the {key} in the {:?}", filepath));

    config_array
        .iter()
        .map(|x| T::parse_value(&x.clone().into_string().expect("Should be a string")))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_get_parameter() {
        let filepath = Path::new("config/parameters_control.yaml");

        let control_frequency: f64 = get_parameter(filepath, "control_frequency");
        assert_eq!(control_frequency, 100.0);

        let can_source: u8 = get_parameter(filepath, "can_source");
        assert_eq!(can_source, 5);

        let is_present: bool = get_parameter(filepath, "abs_encoder_present");
        assert!(is_present);
    }

    #[test]
    fn test_get_parameter_array() {
        let filepath = Path::new("config/parameters_control.yaml");

        let gains: Vec<f32> = get_parameter_array(filepath, "position_gains");

        assert_eq!(gains.len(), 4);
        assert_eq!(gains[0], 4.0);
    }

    #[test]
    fn test_get_parameter_temp_file() {
        let mut file = NamedTempFile::with_suffix(".yaml").unwrap();
        writeln!(file, "---\nanswer: \"42\"").unwrap();

        let answer: usize = get_parameter(file.path(), "answer");

        assert_eq!(answer, 42);
    }
}
