fn main() {
    wardline_lib::run()
}
