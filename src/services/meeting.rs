// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Meeting link generation for confirmed sessions.
//!
//! Every platform is a placeholder: nothing is registered with Google or
//! Zoom. Identifiers and passwords double as access secrets, so all of them
//! come from the operating system CSPRNG (`ring::rand::SystemRandom`).

use crate::models::{MeetingDetails, MeetingPlatform};
use ring::rand::{SecureRandom, SystemRandom};
use std::sync::Arc;

const ALPHANUMERIC: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
/// Largest multiple of 62 that fits in a byte; bytes at or above it are rejected.
const ALPHANUMERIC_ACCEPT_BELOW: u8 = 248;

const ZOOM_PASSWORD_LEN: usize = 6;
const CUSTOM_PASSWORD_LEN: usize = 8;
/// Zoom ids are drawn uniformly from `0..ZOOM_ID_RANGE` and zero-padded to 11 digits.
const ZOOM_ID_RANGE: u64 = 99_999_999_999;

/// Errors from meeting generation.
#[derive(Debug, thiserror::Error)]
pub enum MeetingError {
    #[error("Secure random source unavailable")]
    Random,

    #[error("No meeting provider registered for {0:?}")]
    NoProvider(MeetingPlatform),
}

impl From<MeetingError> for crate::error::AppError {
    fn from(err: MeetingError) -> Self {
        crate::error::AppError::Internal(anyhow::Error::new(err))
    }
}

/// What a provider knows about the session it creates a meeting for.
#[derive(Debug, Clone)]
pub struct MeetingContext {
    pub session_id: i64,
    /// e.g. "Algebra - Ana Torres with Luis Vega"
    pub topic: String,
}

/// Source of unpredictable tokens.
#[derive(Clone)]
pub struct SecretSource {
    rng: Arc<dyn SecureRandom + Send + Sync>,
}

impl Default for SecretSource {
    fn default() -> Self {
        Self {
            rng: Arc::new(SystemRandom::new()),
        }
    }
}

impl SecretSource {
    fn fill(&self, buf: &mut [u8]) -> Result<(), MeetingError> {
        self.rng.fill(buf).map_err(|_| MeetingError::Random)
    }

    /// Lowercase hex string of `len` characters (`len` must be even).
    pub fn hex_token(&self, len: usize) -> Result<String, MeetingError> {
        let mut bytes = vec![0u8; len / 2];
        self.fill(&mut bytes)?;
        Ok(hex::encode(bytes))
    }

    /// `[A-Za-z0-9]{len}`, unbiased.
    pub fn alphanumeric(&self, len: usize) -> Result<String, MeetingError> {
        let mut out = String::with_capacity(len);
        let mut buf = [0u8; 32];
        while out.len() < len {
            self.fill(&mut buf)?;
            for &b in buf.iter().filter(|&&b| b < ALPHANUMERIC_ACCEPT_BELOW) {
                if out.len() == len {
                    break;
                }
                out.push(char::from(ALPHANUMERIC[usize::from(b) % ALPHANUMERIC.len()]));
            }
        }
        Ok(out)
    }

    /// Uniform integer in `0..bound`.
    pub fn below(&self, bound: u64) -> Result<u64, MeetingError> {
        debug_assert!(bound > 0);
        let zone = u64::MAX - (u64::MAX % bound);
        loop {
            let mut buf = [0u8; 8];
            self.fill(&mut buf)?;
            let value = u64::from_le_bytes(buf);
            if value < zone {
                return Ok(value % bound);
            }
        }
    }
}

/// One video platform's way of producing join details.
pub trait MeetingProvider: Send + Sync {
    fn platform(&self) -> MeetingPlatform;

    fn create_meeting(&self, ctx: &MeetingContext) -> Result<MeetingDetails, MeetingError>;
}

/// Google Meet style rooms: `xxx-xxxx-xxx` code, no password.
pub struct GoogleMeetProvider {
    secrets: SecretSource,
}

impl MeetingProvider for GoogleMeetProvider {
    fn platform(&self) -> MeetingPlatform {
        MeetingPlatform::GoogleMeet
    }

    fn create_meeting(&self, _ctx: &MeetingContext) -> Result<MeetingDetails, MeetingError> {
        let token = self.secrets.hex_token(10)?;
        let meeting_id = format!("{}-{}-{}", &token[..3], &token[3..7], &token[7..]);
        let meeting_url = format!("https://meet.google.com/{}", token);

        Ok(MeetingDetails {
            host_join_url: meeting_url.clone(),
            meeting_url,
            meeting_id,
            meeting_password: None,
        })
    }
}

/// Zoom style meetings: 11 digit id, 6 character password, separate host link.
pub struct ZoomProvider {
    secrets: SecretSource,
}

impl MeetingProvider for ZoomProvider {
    fn platform(&self) -> MeetingPlatform {
        MeetingPlatform::Zoom
    }

    fn create_meeting(&self, _ctx: &MeetingContext) -> Result<MeetingDetails, MeetingError> {
        let raw_id = format!("{:011}", self.secrets.below(ZOOM_ID_RANGE)?);
        let password = self.secrets.alphanumeric(ZOOM_PASSWORD_LEN)?;
        let host_token = self.secrets.hex_token(16)?;

        Ok(MeetingDetails {
            meeting_url: format!(
                "https://zoom.us/j/{}?pwd={}",
                raw_id,
                urlencoding::encode(&password)
            ),
            host_join_url: format!("https://zoom.us/s/{}?zak=host_{}", raw_id, host_token),
            meeting_id: format!("{} {} {}", &raw_id[..3], &raw_id[3..7], &raw_id[7..]),
            meeting_password: Some(password),
        })
    }
}

/// Rooms on our own meeting service.
pub struct CustomRoomProvider {
    secrets: SecretSource,
    base_url: String,
}

impl MeetingProvider for CustomRoomProvider {
    fn platform(&self) -> MeetingPlatform {
        MeetingPlatform::Custom
    }

    fn create_meeting(&self, _ctx: &MeetingContext) -> Result<MeetingDetails, MeetingError> {
        let room_id = self.secrets.hex_token(12)?;
        let meeting_url = format!("{}/room/{}", self.base_url, room_id);

        Ok(MeetingDetails {
            host_join_url: meeting_url.clone(),
            meeting_url,
            meeting_id: room_id,
            meeting_password: Some(self.secrets.alphanumeric(CUSTOM_PASSWORD_LEN)?),
        })
    }
}

/// Dispatches to the provider registered for the selected platform.
#[derive(Clone)]
pub struct MeetingService {
    providers: Vec<Arc<dyn MeetingProvider>>,
}

impl MeetingService {
    /// Providers backed by the system CSPRNG.
    pub fn new(custom_base_url: &str) -> Self {
        let secrets = SecretSource::default();
        Self {
            providers: vec![
                Arc::new(GoogleMeetProvider {
                    secrets: secrets.clone(),
                }),
                Arc::new(ZoomProvider {
                    secrets: secrets.clone(),
                }),
                Arc::new(CustomRoomProvider {
                    secrets,
                    base_url: custom_base_url.trim_end_matches('/').to_string(),
                }),
            ],
        }
    }

    /// Replace the provider for `provider.platform()` (tests, real API
    /// integrations).
    pub fn with_provider(mut self, provider: Arc<dyn MeetingProvider>) -> Self {
        let platform = provider.platform();
        self.providers.retain(|p| p.platform() != platform);
        self.providers.push(provider);
        self
    }

    pub fn provider(&self, platform: MeetingPlatform) -> Result<&dyn MeetingProvider, MeetingError> {
        self.providers
            .iter()
            .find(|p| p.platform() == platform)
            .map(|p| p.as_ref())
            .ok_or(MeetingError::NoProvider(platform))
    }

    /// Fresh join details for `platform`.
    pub fn assign(
        &self,
        platform: MeetingPlatform,
        ctx: &MeetingContext,
    ) -> Result<MeetingDetails, MeetingError> {
        let details = self.provider(platform)?.create_meeting(ctx)?;
        tracing::debug!(
            session_id = ctx.session_id,
            topic = %ctx.topic,
            platform = platform.display_name(),
            meeting_id = %details.meeting_id,
            "Generated meeting details"
        );
        Ok(details)
    }
}
