use std::fmt;
use tracing::{debug, info};

use super::GraphData;
use super::builder::GraphBuilder;
use crate::error::WorkbenchResult;

/// What produced the currently displayed subgraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterSource {
    Construct,
    Custom,
}

impl fmt::Display for FilterSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterSource::Construct => write!(f, "construct"),
            FilterSource::Custom => write!(f, "custom"),
        }
    }
}

/// Filtered-vs-original state of the displayed graph.
///
/// The snapshot exists only while filtered, so an unfiltered state can
/// never carry a stale original.
#[derive(Debug, Clone, Default)]
pub enum GraphFilter {
    #[default]
    Unfiltered,
    Filtered {
        original: Box<GraphData>,
        source: FilterSource,
        description: Option<String>,
    },
}

impl GraphFilter {
    pub fn is_filtered(&self) -> bool {
        matches!(self, GraphFilter::Filtered { .. })
    }

    pub fn source(&self) -> Option<FilterSource> {
        match self {
            GraphFilter::Filtered { source, .. } => Some(*source),
            GraphFilter::Unfiltered => None,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            GraphFilter::Filtered { description, .. } => description.as_deref(),
            GraphFilter::Unfiltered => None,
        }
    }

    /// Replace `live` with the graph parsed from `turtle`.
    ///
    /// The payload is parsed before anything is touched, and the original is
    /// snapshotted only on the first application.
    pub fn apply(
        &mut self,
        live: &mut GraphData,
        turtle: &str,
        source: FilterSource,
        description: Option<String>,
    ) -> WorkbenchResult<()> {
        let filtered = GraphBuilder::from_turtle(turtle)?;
        self.apply_graph(live, filtered, source, description);
        Ok(())
    }

    pub fn apply_graph(
        &mut self,
        live: &mut GraphData,
        filtered: GraphData,
        source: FilterSource,
        description: Option<String>,
    ) {
        let replaced = std::mem::replace(live, filtered);
        match self {
            GraphFilter::Unfiltered => {
                debug!(
                    nodes = replaced.node_count(),
                    edges = replaced.edge_count(),
                    "snapshotting original graph"
                );
                *self = GraphFilter::Filtered {
                    original: Box::new(replaced),
                    source,
                    description,
                };
            }
            GraphFilter::Filtered {
                source: current_source,
                description: current_description,
                ..
            } => {
                *current_source = source;
                *current_description = description;
            }
        }
        info!(
            nodes = live.node_count(),
            edges = live.edge_count(),
            %source,
            "graph filter applied"
        );
    }

    /// Put the original graph back. Returns false (and changes nothing) when
    /// no filter is active.
    pub fn restore(&mut self, live: &mut GraphData) -> bool {
        match std::mem::take(self) {
            GraphFilter::Unfiltered => false,
            GraphFilter::Filtered { original, .. } => {
                *live = *original;
                info!(nodes = live.node_count(), "original graph restored");
                true
            }
        }
    }
}
