pub mod camera {
    pub mod domain {
        pub mod camera_port;
        pub mod camera_session;
        pub mod raw_capture;
    }
    pub mod infrastructure;
}

pub mod detection {
    pub mod domain {
        pub mod detected_face;
        pub mod detector_options;
        pub mod detector_port;
        pub mod emotion_classifier;
    }
    pub mod infrastructure;
}

pub mod imaging {
    pub mod domain {
        pub mod frame_rotator;
        pub mod still_decoder;
    }
    pub mod infrastructure;
}

pub mod pipeline {
    pub mod capture_scheduler;
    pub mod frame_pipeline;
    pub mod infrastructure;
    pub mod pipeline_config;
    pub mod pipeline_controller;
    pub mod pipeline_error;
    pub mod pipeline_event;
    pub mod pipeline_logger;
    pub mod result_sink;
    #[cfg(test)]
    pub(crate) mod test_support;
}

pub mod shared {
    pub mod camera_selector;
    pub mod completion;
    pub mod constants;
    pub mod frame;
    pub mod oriented_frame;
}
