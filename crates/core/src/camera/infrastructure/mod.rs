pub mod directory_camera;
