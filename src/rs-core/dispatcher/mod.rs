use crate::{
    bindings::TimerId,
    estimator::{ContentLengthRegistry, NetworkEstimator},
    wasm_bindgen,
};

mod api;
mod core;
mod event_listeners;

pub use event_listeners::ResourceTiming;

/// The `Dispatcher` is the network estimation interface exported to the JavaScript-side.
///
/// It receives resource timings and content lengths observed by the JavaScript-side, and
/// periodically announces bandwidth and RTT estimates computed from them.
#[wasm_bindgen]
pub struct Dispatcher {
    /// Produces the estimates from the samples received.
    estimator: NetworkEstimator,

    /// Sizes of resources, as seen in their `Content-Length` header, for resources whose
    /// timings do not advertise a transfer size (e.g. cross-origin resources without a
    /// `Timing-Allow-Origin` header).
    content_lengths: ContentLengthRegistry,

    /// Identifier of the pending timer for the next estimate refresh.
    ///
    /// `None` when estimates are not periodically refreshed, i.e. before `start` is called or
    /// after `stop` is called.
    refresh_timer: Option<TimerId>,
}
