use crate::{AppState, error::AppError};
use analytics::{
    AnalyticsError, Anomaly, AnomalyDetector, DescriptiveStats, ExecutiveSummary, Insight,
    InsightGenerator, Prediction, PredictionEngine, StatisticsEngine, Trend,
};
use axum::{Json, extract::State};
use configuration::{DetectionOptions, InsightOptions, PredictionOptions, SummaryOptions};
use core_types::DataSeries;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct SeriesRequest {
    pub series: DataSeries,
}

/// A single series, optionally with per-call options.
#[derive(Debug, Deserialize)]
pub struct AnalysisRequest<O> {
    pub series: DataSeries,
    #[serde(default)]
    pub options: Option<O>,
}

#[derive(Debug, Deserialize)]
pub struct SummaryRequest {
    pub series: Vec<DataSeries>,
    #[serde(default)]
    pub period: Option<String>,
}

/// Runs a CPU-bound analysis off the async workers.
async fn run_blocking<T, F>(job: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, AnalyticsError> + Send + 'static,
    T: Send + 'static,
{
    Ok(tokio::task::spawn_blocking(job).await??)
}

/// # POST /api/stats
pub async fn stats(
    Json(request): Json<SeriesRequest>,
) -> Result<Json<DescriptiveStats>, AppError> {
    let series = request.series;
    let name = series.name.clone();
    let stats = run_blocking(move || {
        series.validate()?;
        Ok(StatisticsEngine::new().describe(&series.values()))
    })
    .await?;
    stats
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Series '{name}' has no data points")))
}

/// # POST /api/anomalies
pub async fn anomalies(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalysisRequest<DetectionOptions>>,
) -> Result<Json<Vec<Anomaly>>, AppError> {
    let options = request
        .options
        .unwrap_or_else(|| state.settings.detection.clone());
    let series = request.series;
    let anomalies =
        run_blocking(move || AnomalyDetector::new().detect_anomalies(&series, &options)).await?;
    Ok(Json(anomalies))
}

/// # POST /api/trend
pub async fn trend(Json(request): Json<SeriesRequest>) -> Result<Json<Trend>, AppError> {
    let series = request.series;
    let trend = run_blocking(move || PredictionEngine::new().analyze_trend(&series)).await?;
    Ok(Json(trend))
}

/// # POST /api/predictions
pub async fn predictions(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalysisRequest<PredictionOptions>>,
) -> Result<Json<Vec<Prediction>>, AppError> {
    let options = request
        .options
        .unwrap_or_else(|| state.settings.prediction.clone());
    let series = request.series;
    let predictions =
        run_blocking(move || PredictionEngine::new().predict(&series, &options)).await?;
    Ok(Json(predictions))
}

/// # POST /api/insights
pub async fn insights(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalysisRequest<InsightOptions>>,
) -> Result<Json<Vec<Insight>>, AppError> {
    let options = request
        .options
        .unwrap_or_else(|| state.settings.insights.clone());
    let generator = state.generator();
    let series = request.series;
    let insights = run_blocking(move || generator.generate_insights(&series, &options)).await?;
    Ok(Json(insights))
}

/// # POST /api/summary
/// Builds an executive summary across every series in the body.
pub async fn summary(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SummaryRequest>,
) -> Result<Json<ExecutiveSummary>, AppError> {
    let generator = state.generator();
    let options = SummaryOptions {
        period: request.period,
        insights: state.settings.insights.clone(),
    };
    let series = request.series;
    let summary =
        run_blocking(move || generator.generate_executive_summary(&series, &options)).await?;
    Ok(Json(summary))
}
