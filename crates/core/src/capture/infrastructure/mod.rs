pub mod synthetic_capture_device;
