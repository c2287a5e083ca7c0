fn main() {
    slint_build::compile("ui/studio.slint").expect("Slint build failed");
}
