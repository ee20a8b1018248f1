fn main() {
    intelscan::app::startup::startup();
}
