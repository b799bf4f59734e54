use hexscape::SceneConfig;

fn main() -> anyhow::Result<()> {
    hexscape::run(SceneConfig::default())
}
