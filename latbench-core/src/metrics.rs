/// Metric names recorded for every timed operation of a scenario.
#[derive(Copy, Clone, Debug)]
pub struct OperationLabels {
    pub success: &'static str,
    pub error: &'static str,
    pub latency: &'static str,
}

#[macro_export]
macro_rules! generate_labels {
    ($base_name:literal) => {
        $crate::OperationLabels {
            success: concat!($base_name, "_success"),
            error: concat!($base_name, "_error"),
            latency: concat!($base_name, "_latency"),
        }
    };
}
