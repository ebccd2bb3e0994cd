//! Canonical platform identifiers (`PCM-09`) versus the short display form
//! (`M9`) used in route strings and gangway tables.

/// Short display form of a canonical platform name.
///
/// `PCM-XX` becomes `M<XX>` with the leading zero stripped, `PCB-XX`
/// becomes `B<XX>`, and the `PGA`/`PDO`/`PRB` families keep their family
/// prefix. `TMIB` is unchanged, as is anything unrecognized.
pub fn short_name(canonical: &str) -> String {
    if let Some((family, number)) = canonical.split_once('-') {
        let number = number.trim_start_matches('0');
        match family {
            "PCM" => return format!("M{number}"),
            "PCB" => return format!("B{number}"),
            "PGA" | "PDO" | "PRB" => return format!("{family}{number}"),
            _ => {}
        }
    }
    canonical.to_string()
}

/// Inverse of [`short_name`]: expands a short form back to the canonical
/// identifier. Unrecognized input is returned as-is.
pub fn canonical_name(short: &str) -> String {
    let short = short.trim();
    for family in ["PGA", "PDO", "PRB"] {
        if let Some(number) = short.strip_prefix(family)
            && !number.is_empty()
            && number.chars().all(|c| c.is_ascii_digit())
        {
            return format!("{family}-{:02}", number.parse::<u32>().unwrap_or(0));
        }
    }
    let expand = |family: &str, number: &str| {
        format!("{family}-{:02}", number.parse::<u32>().unwrap_or(0))
    };
    if let Some(number) = short.strip_prefix('M')
        && !number.is_empty()
        && number.chars().all(|c| c.is_ascii_digit())
    {
        return expand("PCM", number);
    }
    if let Some(number) = short.strip_prefix('B')
        && !number.is_empty()
        && number.chars().all(|c| c.is_ascii_digit())
    {
        return expand("PCB", number);
    }
    short.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pcm_strips_leading_zero() {
        assert_eq!(short_name("PCM-09"), "M9");
        assert_eq!(short_name("PCM-10"), "M10");
    }

    #[test]
    fn pcb_maps_to_b() {
        assert_eq!(short_name("PCB-01"), "B1");
    }

    #[test]
    fn families_keep_prefix() {
        assert_eq!(short_name("PGA-07"), "PGA7");
        assert_eq!(short_name("PDO-02"), "PDO2");
        assert_eq!(short_name("PRB-01"), "PRB1");
    }

    #[test]
    fn tmib_unchanged() {
        assert_eq!(short_name("TMIB"), "TMIB");
        assert_eq!(canonical_name("TMIB"), "TMIB");
    }

    #[test]
    fn canonical_roundtrip() {
        for name in ["PCM-09", "PCM-02", "PCB-04", "PGA-07", "PDO-01", "PRB-01"] {
            assert_eq!(canonical_name(&short_name(name)), name);
        }
    }
}
