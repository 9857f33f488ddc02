fn main() {
    if let Err(e) = frame_scene::start() {
        eprintln!("frame-scene exited with an error: {:#}", e);
        std::process::exit(1);
    }
}
