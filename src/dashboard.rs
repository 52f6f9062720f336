//! Cost and usage dashboard composition.
//!
//! Entries keep registration order and are never deduplicated: registering the
//! same model twice yields two widgets.

use crate::config::MonitoredModelConfig;
use crate::model::foundation_model_arn;
use serde::{Deserialize, Serialize};

/// Per-model monitoring entry with on-demand prices per 1K tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMonitor {
    pub display_name: String,
    pub model_id: String,
    pub model_arn: String,
    pub input_price: f64,
    pub output_price: f64,
}

impl ModelMonitor {
    /// Estimated cost of a token volume.
    pub fn estimate_cost(&self, input_tokens: u64, output_tokens: u64) -> f64 {
        (input_tokens as f64 / 1000.0) * self.input_price
            + (output_tokens as f64 / 1000.0) * self.output_price
    }
}

/// One dashboard widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Widget {
    /// Aggregate invocations, latency and tokens across every model.
    AllModels,
    Model(ModelMonitor),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSpec {
    pub name: String,
    pub widgets: Vec<Widget>,
}

impl DashboardSpec {
    /// The per-model entries, in registration order.
    pub fn monitors(&self) -> impl Iterator<Item = &ModelMonitor> {
        self.widgets.iter().filter_map(|w| match w {
            Widget::Model(m) => Some(m),
            Widget::AllModels => None,
        })
    }
}

/// Accumulates model registrations into a [`DashboardSpec`].
#[derive(Debug, Clone)]
pub struct DashboardComposer {
    name: String,
    region: String,
    monitors: Vec<ModelMonitor>,
}

impl DashboardComposer {
    pub fn new(name: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            region: region.into(),
            monitors: Vec::new(),
        }
    }

    pub fn add_model_monitoring(
        &mut self,
        display_name: &str,
        model_id: &str,
        input_price: f64,
        output_price: f64,
    ) -> &mut Self {
        self.monitors.push(ModelMonitor {
            display_name: display_name.to_string(),
            model_id: model_id.to_string(),
            model_arn: foundation_model_arn(&self.region, model_id),
            input_price,
            output_price,
        });
        self
    }

    pub fn add_configured(&mut self, config: &MonitoredModelConfig) -> &mut Self {
        self.add_model_monitoring(
            &config.display_name,
            &config.model_id,
            config.input_price,
            config.output_price,
        )
    }

    /// The aggregate widget first, then one widget per registration.
    pub fn build(&self) -> DashboardSpec {
        let mut widgets = Vec::with_capacity(self.monitors.len() + 1);
        widgets.push(Widget::AllModels);
        widgets.extend(self.monitors.iter().cloned().map(Widget::Model));
        DashboardSpec {
            name: self.name.clone(),
            widgets,
        }
    }
}
