use crate::error::AppError;
use crate::prediction::AdvisoryModel;
use crate::prediction::assembler::PredictionAssembler;
use crate::weather::source::CachedWeather;
use tokio::sync::watch;

#[derive(Debug)]
pub struct AppState {
    assembler: PredictionAssembler,
    weather: Option<CachedWeather>,
    latest: Option<AdvisoryModel>,
    latest_tx: watch::Sender<Option<AdvisoryModel>>,
}

impl AppState {
    pub fn new(assembler: PredictionAssembler, weather: Option<CachedWeather>) -> Self {
        let (latest_tx, _latest_rx) = watch::channel(None);
        Self {
            assembler,
            weather,
            latest: None,
            latest_tx,
        }
    }

    pub fn assembler(&self) -> &PredictionAssembler {
        &self.assembler
    }

    /// `None` when weather lookups are disabled.
    pub fn weather(&self) -> Option<&CachedWeather> {
        self.weather.as_ref()
    }

    pub fn latest(&self) -> Option<&AdvisoryModel> {
        self.latest.as_ref()
    }

    pub fn subscribe_latest(&self) -> watch::Receiver<Option<AdvisoryModel>> {
        self.latest_tx.subscribe()
    }

    /// Fails with [`AppError::WatchSend`] only when there are no subscribers;
    /// the stored value is updated either way.
    pub fn set_latest(&mut self, advisory: AdvisoryModel) -> Result<(), AppError> {
        self.latest = Some(advisory.clone());
        self.latest_tx
            .send(Some(advisory))
            .map_err(|_| AppError::WatchSend)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(PredictionAssembler::default(), None)
    }
}
