fn main() {
    butter_flow_lib::run()
}
