fn main() -> anyhow::Result<()> {
    ytogg_lib::run()
}
