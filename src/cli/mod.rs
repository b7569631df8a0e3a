/// Compute backend selection for the binaries
pub mod backend;

/// Named architecture presets
pub mod models;

use std::ffi::OsString;

/// Parse raw token ids left over after option parsing. Negative ids such as `-1` are allowed.
pub fn parse_token_ids(values: Vec<OsString>) -> anyhow::Result<Vec<i64>> {
    values
        .into_iter()
        .map(|value| {
            let value = value
                .into_string()
                .map_err(|v| anyhow!("Invalid token id: {:?}", v))?;

            value
                .parse()
                .map_err(|_| anyhow!("Invalid token id: {}", value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parses_negative_ids() {
        let values = vec![OsString::from("-1"), OsString::from("12")];

        assert_eq!(parse_token_ids(values).unwrap(), vec![-1, 12]);
        assert!(parse_token_ids(vec![OsString::from("x")]).is_err());
    }
}
