//! TTS dispatch: batch vs. per-segment strategy.
//!
//! When every active voice shares one provider tag, that provider is
//! batch-capable and batching is not disabled for the run, the whole script
//! goes through one `synthesize_batch` call. Otherwise segments are
//! synthesized strictly in order, each routed to the provider of its
//! speaker's voice, paced per the provider's RPM limit and wrapped in the
//! retry helper.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use podcaster_audio::{convert_to_mp3, AudioToolError};
use podcaster_core::{
    roster_names, AudioFormat, AudioResult, ProviderKind, Script, SpeechError, SpeechProvider,
    VoiceMap,
};

use crate::rate::RateGate;
use crate::registry::ProviderSet;
use crate::retry::with_retry;

/// Errors from the dispatch layer.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A synthesis call failed past its retry budget.
    #[error(transparent)]
    Speech(#[from] SpeechError),

    /// Converting a non-MP3 payload failed.
    #[error(transparent)]
    Audio(#[from] AudioToolError),

    /// A segment speaker has no voice slot. Script validation should make
    /// this unreachable; kept as a hard error rather than a panic.
    #[error("no voice bound for speaker '{speaker}'")]
    UnboundSpeaker {
        /// The speaker that failed to resolve.
        speaker: String,
    },

    /// Writing a segment file failed.
    #[error("failed to write segment file {path}: {message}")]
    Io {
        /// The path that failed.
        path: String,
        /// Underlying error text.
        message: String,
    },

    /// Cancellation observed.
    #[error("synthesis canceled")]
    Canceled,
}

/// Provider lookup seam, implemented by [`ProviderSet`].
#[async_trait]
pub trait ProviderLookup: Send + Sync {
    /// Resolve a provider by tag.
    async fn get(&self, kind: ProviderKind) -> Result<Arc<dyn SpeechProvider>, SpeechError>;

    /// Whether the operator disabled the batch path for this provider.
    ///
    /// Batch endpoints with a daily quota are shared deployment-wide; this
    /// switch protects that quota across jobs, independent of what any one
    /// request asks for.
    fn batch_disabled(&self, kind: ProviderKind) -> bool {
        let _ = kind;
        false
    }
}

#[async_trait]
impl ProviderLookup for ProviderSet {
    async fn get(&self, kind: ProviderKind) -> Result<Arc<dyn SpeechProvider>, SpeechError> {
        Self::get(self, kind).await
    }

    fn batch_disabled(&self, kind: ProviderKind) -> bool {
        Self::batch_disabled(self, kind)
    }
}

/// Per-job TTS dispatcher.
pub struct Dispatcher {
    providers: Arc<dyn ProviderLookup>,
    gates: Mutex<HashMap<ProviderKind, Arc<RateGate>>>,
}

impl Dispatcher {
    /// Create a dispatcher over a provider pool.
    pub fn new(providers: Arc<dyn ProviderLookup>) -> Self {
        Self {
            providers,
            gates: Mutex::new(HashMap::new()),
        }
    }

    /// Synthesize the whole script into ordered MP3 segment files under
    /// `scratch`. Returns the file paths in playback order.
    ///
    /// `disable_batch` is the per-run opt-out; the operator's per-provider
    /// switch on the pool is honored regardless of it.
    pub async fn synthesize(
        &self,
        script: &Script,
        voices: &VoiceMap,
        scratch: &Path,
        disable_batch: bool,
        cancel: &CancellationToken,
        mut on_segment: impl FnMut(usize, usize) + Send,
    ) -> Result<Vec<PathBuf>, DispatchError> {
        let total = script.segments.len();

        if let Some(kind) = voices.uniform_provider() {
            if !disable_batch && !self.providers.batch_disabled(kind) {
                let provider = self.providers.get(kind).await.map_err(map_cancel)?;
                if provider.as_batch().is_some() {
                    let path = self
                        .run_batch(provider.as_ref(), script, voices, scratch, cancel)
                        .await?;
                    on_segment(total, total);
                    return Ok(vec![path]);
                }
            }
        }

        self.run_sequential(script, voices, scratch, cancel, &mut on_segment)
            .await
    }

    /// One batch call producing a single combined payload.
    async fn run_batch(
        &self,
        provider: &dyn SpeechProvider,
        script: &Script,
        voices: &VoiceMap,
        scratch: &Path,
        cancel: &CancellationToken,
    ) -> Result<PathBuf, DispatchError> {
        info!(provider = %provider.name(), segments = script.segments.len(), "batch synthesis");

        let batch = provider
            .as_batch()
            .expect("caller checked batch capability");

        self.gate_for(provider).await.wait().await;
        let result = with_retry("batch", cancel, || batch.synthesize_batch(script, voices))
            .await
            .map_err(map_cancel)?;

        write_segment(scratch, 0, &result).await
    }

    /// The strictly sequential per-segment loop.
    async fn run_sequential(
        &self,
        script: &Script,
        voices: &VoiceMap,
        scratch: &Path,
        cancel: &CancellationToken,
        on_segment: &mut (impl FnMut(usize, usize) + Send),
    ) -> Result<Vec<PathBuf>, DispatchError> {
        let names = roster_names(voices.len());
        let total = script.segments.len();
        let mut paths = Vec::with_capacity(total);

        for (index, segment) in script.segments.iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(DispatchError::Canceled);
            }

            let slot = names
                .iter()
                .position(|n| *n == segment.speaker)
                .ok_or_else(|| DispatchError::UnboundSpeaker {
                    speaker: segment.speaker.clone(),
                })?;
            let voice = voices.slot(slot).ok_or_else(|| DispatchError::UnboundSpeaker {
                speaker: segment.speaker.clone(),
            })?;

            let provider = self.providers.get(voice.provider).await.map_err(map_cancel)?;
            self.gate_for(provider.as_ref()).await.wait().await;

            debug!(
                segment = index,
                speaker = %segment.speaker,
                provider = %voice.provider,
                voice = %voice.id,
                "synthesizing segment"
            );

            let label = format!("segment {index}");
            let text = segment.text.as_str();
            let result = with_retry(&label, cancel, || provider.synthesize(text, voice))
                .await
                .map_err(map_cancel)?;

            paths.push(write_segment(scratch, index, &result).await?);
            on_segment(index + 1, total);
        }

        Ok(paths)
    }

    /// Rate gate for a provider, created on first use from its limits.
    async fn gate_for(&self, provider: &dyn SpeechProvider) -> Arc<RateGate> {
        let mut gates = self.gates.lock().await;
        Arc::clone(
            gates
                .entry(provider.name())
                .or_insert_with(|| Arc::new(RateGate::new(provider.limits().min_interval()))),
        )
    }
}

fn map_cancel(error: SpeechError) -> DispatchError {
    match error {
        SpeechError::Canceled => DispatchError::Canceled,
        other => DispatchError::Speech(other),
    }
}

/// Write one payload as `segment_{index:03}.mp3`, converting non-MP3 input
/// via the external tool.
async fn write_segment(
    scratch: &Path,
    index: usize,
    result: &AudioResult,
) -> Result<PathBuf, DispatchError> {
    let mp3_path = scratch.join(format!("segment_{index:03}.mp3"));

    match result.format {
        AudioFormat::Mp3 => {
            tokio::fs::write(&mp3_path, &result.data)
                .await
                .map_err(|e| DispatchError::Io {
                    path: mp3_path.display().to_string(),
                    message: e.to_string(),
                })?;
        }
        format @ (AudioFormat::Pcm24k | AudioFormat::Wav) => {
            let raw_path = scratch.join(format!("segment_{index:03}.raw"));
            tokio::fs::write(&raw_path, &result.data)
                .await
                .map_err(|e| DispatchError::Io {
                    path: raw_path.display().to_string(),
                    message: e.to_string(),
                })?;
            convert_to_mp3(&raw_path, format, &mp3_path).await?;
        }
    }

    Ok(mp3_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use podcaster_core::{
        BatchSynthesizer, ProviderLimits, Segment, Voice, VoiceInfo,
    };
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fake provider recording call counts.
    struct FakeProvider {
        kind: ProviderKind,
        rpm: u32,
        batch: bool,
        single_calls: AtomicU32,
        batch_calls: AtomicU32,
    }

    impl FakeProvider {
        fn new(kind: ProviderKind, rpm: u32, batch: bool) -> Self {
            Self {
                kind,
                rpm,
                batch,
                single_calls: AtomicU32::new(0),
                batch_calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl SpeechProvider for FakeProvider {
        fn name(&self) -> ProviderKind {
            self.kind
        }

        fn default_voices(&self) -> VoiceMap {
            VoiceMap::new(vec![
                Voice::new("v1", "V1", self.kind),
                Voice::new("v2", "V2", self.kind),
                Voice::new("v3", "V3", self.kind),
            ])
            .unwrap()
        }

        fn voice_catalog(&self) -> Vec<VoiceInfo> {
            vec![]
        }

        fn limits(&self) -> ProviderLimits {
            ProviderLimits {
                rpm: self.rpm,
                batch_rpd: None,
            }
        }

        async fn synthesize(
            &self,
            _text: &str,
            _voice: &Voice,
        ) -> Result<AudioResult, SpeechError> {
            self.single_calls.fetch_add(1, Ordering::SeqCst);
            Ok(AudioResult::new(vec![1, 2, 3], AudioFormat::Mp3))
        }

        fn as_batch(&self) -> Option<&dyn BatchSynthesizer> {
            self.batch.then_some(self as &dyn BatchSynthesizer)
        }
    }

    #[async_trait]
    impl BatchSynthesizer for FakeProvider {
        async fn synthesize_batch(
            &self,
            _script: &Script,
            _voices: &VoiceMap,
        ) -> Result<AudioResult, SpeechError> {
            self.batch_calls.fetch_add(1, Ordering::SeqCst);
            Ok(AudioResult::new(vec![9, 9, 9], AudioFormat::Mp3))
        }
    }

    struct FakeLookup {
        providers: HashMap<ProviderKind, Arc<FakeProvider>>,
        operator_disabled: std::collections::HashSet<ProviderKind>,
    }

    #[async_trait]
    impl ProviderLookup for FakeLookup {
        async fn get(
            &self,
            kind: ProviderKind,
        ) -> Result<Arc<dyn SpeechProvider>, SpeechError> {
            Ok(self.providers[&kind].clone() as Arc<dyn SpeechProvider>)
        }

        fn batch_disabled(&self, kind: ProviderKind) -> bool {
            self.operator_disabled.contains(&kind)
        }
    }

    fn script(n: usize) -> Script {
        let segments = (0..n)
            .map(|i| {
                Segment::new(
                    if i % 2 == 0 { "Maya" } else { "Theo" },
                    format!("Line {i}."),
                )
            })
            .collect();
        Script {
            title: "T".into(),
            summary: "S".into(),
            segments,
        }
    }

    fn voices(kind_a: ProviderKind, kind_b: ProviderKind) -> VoiceMap {
        VoiceMap::new(vec![
            Voice::new("v1", "V1", kind_a),
            Voice::new("v2", "V2", kind_b),
        ])
        .unwrap()
    }

    fn lookup(providers: Vec<Arc<FakeProvider>>) -> Arc<FakeLookup> {
        Arc::new(FakeLookup {
            providers: providers.into_iter().map(|p| (p.kind, p)).collect(),
            operator_disabled: std::collections::HashSet::new(),
        })
    }

    #[tokio::test]
    async fn batch_path_issues_one_call() {
        let provider = Arc::new(FakeProvider::new(ProviderKind::Gemini, 0, true));
        let dispatcher = Dispatcher::new(lookup(vec![provider.clone()]));
        let dir = tempfile::tempdir().unwrap();

        let mut seen = Vec::new();
        let paths = dispatcher
            .synthesize(
                &script(4),
                &voices(ProviderKind::Gemini, ProviderKind::Gemini),
                dir.path(),
                false,
                &CancellationToken::new(),
                |done, total| seen.push((done, total)),
            )
            .await
            .unwrap();

        assert_eq!(paths.len(), 1);
        assert_eq!(provider.batch_calls.load(Ordering::SeqCst), 1);
        assert_eq!(provider.single_calls.load(Ordering::SeqCst), 0);
        assert_eq!(seen, vec![(4, 4)]);
        assert!(paths[0].ends_with("segment_000.mp3"));
        assert!(paths[0].exists());
    }

    #[tokio::test]
    async fn disable_batch_forces_sequential() {
        let provider = Arc::new(FakeProvider::new(ProviderKind::Gemini, 0, true));
        let dispatcher = Dispatcher::new(lookup(vec![provider.clone()]));
        let dir = tempfile::tempdir().unwrap();

        let paths = dispatcher
            .synthesize(
                &script(3),
                &voices(ProviderKind::Gemini, ProviderKind::Gemini),
                dir.path(),
                true,
                &CancellationToken::new(),
                |_, _| {},
            )
            .await
            .unwrap();

        assert_eq!(paths.len(), 3);
        assert_eq!(provider.batch_calls.load(Ordering::SeqCst), 0);
        assert_eq!(provider.single_calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn operator_batch_switch_overrides_willing_requests() {
        let provider = Arc::new(FakeProvider::new(ProviderKind::Gemini, 0, true));
        let lookup = Arc::new(FakeLookup {
            providers: HashMap::from([(ProviderKind::Gemini, provider.clone())]),
            operator_disabled: std::collections::HashSet::from([ProviderKind::Gemini]),
        });
        let dispatcher = Dispatcher::new(lookup);
        let dir = tempfile::tempdir().unwrap();

        // The request does not opt out, but the deployment switch wins.
        let paths = dispatcher
            .synthesize(
                &script(3),
                &voices(ProviderKind::Gemini, ProviderKind::Gemini),
                dir.path(),
                false,
                &CancellationToken::new(),
                |_, _| {},
            )
            .await
            .unwrap();

        assert_eq!(paths.len(), 3);
        assert_eq!(provider.batch_calls.load(Ordering::SeqCst), 0);
        assert_eq!(provider.single_calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn mixed_providers_route_by_voice() {
        let gemini = Arc::new(FakeProvider::new(ProviderKind::Gemini, 0, true));
        let openai = Arc::new(FakeProvider::new(ProviderKind::Openai, 0, false));
        let dispatcher = Dispatcher::new(lookup(vec![gemini.clone(), openai.clone()]));
        let dir = tempfile::tempdir().unwrap();

        let paths = dispatcher
            .synthesize(
                &script(8),
                &voices(ProviderKind::Gemini, ProviderKind::Openai),
                dir.path(),
                false,
                &CancellationToken::new(),
                |_, _| {},
            )
            .await
            .unwrap();

        // 8 segments alternating Maya/Theo: 4 calls each provider.
        assert_eq!(paths.len(), 8);
        assert_eq!(gemini.single_calls.load(Ordering::SeqCst), 4);
        assert_eq!(openai.single_calls.load(Ordering::SeqCst), 4);
        assert_eq!(gemini.batch_calls.load(Ordering::SeqCst), 0);
        for (i, path) in paths.iter().enumerate() {
            assert!(path.ends_with(format!("segment_{i:03}.mp3")));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn rpm_limit_paces_sequential_calls() {
        let provider = Arc::new(FakeProvider::new(ProviderKind::Gemini, 10, false));
        let dispatcher = Dispatcher::new(lookup(vec![provider.clone()]));
        let dir = tempfile::tempdir().unwrap();
        let started = tokio::time::Instant::now();

        dispatcher
            .synthesize(
                &script(3),
                &voices(ProviderKind::Gemini, ProviderKind::Gemini),
                dir.path(),
                false,
                &CancellationToken::new(),
                |_, _| {},
            )
            .await
            .unwrap();

        // 10 RPM -> 6 s between calls -> at least 12 s for 3 calls.
        assert!(started.elapsed() >= std::time::Duration::from_secs(12));
    }

    #[tokio::test]
    async fn cancellation_stops_the_loop() {
        let provider = Arc::new(FakeProvider::new(ProviderKind::Gemini, 0, false));
        let dispatcher = Dispatcher::new(lookup(vec![provider]));
        let dir = tempfile::tempdir().unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = dispatcher
            .synthesize(
                &script(2),
                &voices(ProviderKind::Gemini, ProviderKind::Gemini),
                dir.path(),
                true,
                &cancel,
                |_, _| {},
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::Canceled));
    }
}
