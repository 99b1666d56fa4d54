use float_ord::FloatOrd;
use ndarray::{ArrayView2, Axis};

/// The spatial cell of maximal response for every feature channel.
///
/// `dense` has shape `[spatial_cells, channels]`. Each channel acts as an
/// implicit keypoint detector: its keypoint is the flat grid index of its
/// strongest response, and its descriptor is the dense-tensor row at that
/// index. No explicit detector runs anywhere in the pipeline.
pub fn channelwise_argmax(dense: ArrayView2<f32>) -> Vec<usize> {
    dense
        .axis_iter(Axis(1))
        .map(|channel| {
            channel
                .iter()
                .enumerate()
                .max_by_key(|&(_, &response)| FloatOrd(response))
                .map(|(cell, _)| cell)
                .unwrap_or(0)
        })
        .collect()
}
