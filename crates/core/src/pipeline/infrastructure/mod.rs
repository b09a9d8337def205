pub mod channel_result_sink;
pub mod fan_out_result_sink;
pub mod logging_result_sink;
pub mod threaded_pipeline_runtime;
