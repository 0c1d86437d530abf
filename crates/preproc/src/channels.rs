//! Channel selection.
//!
//! Channels are configured as a comma-separated list of 1-based,
//! provider-native channel numbers. The list order is the output column
//! order; duplicates are kept.

use std::fmt;
use std::str::FromStr;

use crate::error::{PreprocError, Result};

/// Ordered, validated list of selected channel numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelSelection {
    channels: Vec<i32>,
}

impl ChannelSelection {
    /// Parse a comma-separated list such as `"1,2,5"`.
    ///
    /// A single trailing comma is allowed.
    pub fn parse(list: &str) -> Result<Self> {
        let trimmed = list.trim();
        let body = trimmed.strip_suffix(',').unwrap_or(trimmed);
        let mut channels = Vec::new();
        for token in body.split(',') {
            let token = token.trim();
            let channel: i32 = token.parse().map_err(|_| {
                PreprocError::Config(format!("channel '{}' in '{}' is not an integer", token, list))
            })?;
            if channel < 1 {
                return Err(PreprocError::Config(format!(
                    "channel {} in '{}' must be 1 or greater",
                    channel, list
                )));
            }
            channels.push(channel);
        }
        Ok(Self { channels })
    }

    /// Build from already-typed channel numbers.
    pub fn from_channels(channels: Vec<i32>) -> Result<Self> {
        if channels.is_empty() {
            return Err(PreprocError::Config("channel list is empty".to_string()));
        }
        if let Some(bad) = channels.iter().find(|&&c| c < 1) {
            return Err(PreprocError::Config(format!(
                "channel {} must be 1 or greater",
                bad
            )));
        }
        Ok(Self { channels })
    }

    /// Check every channel against the channel count of a file.
    pub fn validate(&self, channels_in_file: usize) -> Result<()> {
        for &channel in &self.channels {
            if channel as usize > channels_in_file {
                return Err(PreprocError::Config(format!(
                    "channel {} outside [1, {}]",
                    channel, channels_in_file
                )));
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Channel numbers in output order.
    pub fn channels(&self) -> &[i32] {
        &self.channels
    }

    /// Zero-based source indices, in output order.
    pub fn source_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.channels.iter().map(|&c| (c - 1) as usize)
    }
}

impl FromStr for ChannelSelection {
    type Err = PreprocError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for ChannelSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.channels.iter().map(|c| c.to_string()).collect();
        write!(f, "{}", parts.join(","))
    }
}
