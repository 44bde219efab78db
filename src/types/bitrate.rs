use std::{fmt::Display, str::FromStr};

/// An average audio bitrate in kbps.
///
/// Ordered, so the selector can pick the best audio-only stream with a
/// plain comparison. Providers report it either as a float kbps value or
/// as a "128k" suffixed string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Bitrate(u32);

impl Bitrate {
    pub fn from_kbps(kbps: f64) -> Self {
        Self(kbps.round().max(0.0) as u32)
    }

    pub fn kbps(self) -> u32 {
        self.0
    }
}

impl FromStr for Bitrate {
    type Err = Box<dyn std::error::Error + Sync + Send>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(num_prefix) = s.to_lowercase().strip_suffix('k') {
            Ok(Self(num_prefix.parse()?))
        } else {
            Err(Box::from("Bitrate does not end with 'K'"))
        }
    }
}

impl Display for Bitrate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}K", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_follows_kbps() {
        assert!(Bitrate::from_kbps(160.0) > Bitrate::from_kbps(128.0));
        assert_eq!(Bitrate::from_kbps(127.6), Bitrate::from_kbps(128.4));
    }

    #[test]
    fn parse_suffixed() {
        let br: Bitrate = "128K".parse().unwrap();
        assert_eq!(br.kbps(), 128);
        assert!("128".parse::<Bitrate>().is_err());
    }
}
