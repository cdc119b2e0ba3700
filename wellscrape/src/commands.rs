use crate::CLAP_STYLING;

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("wellscrape")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("wellscrape")
        .styles(CLAP_STYLING)
        .about("Downloads Railroad Commission of Texas well reports into ./data")
        .long_about(
            "Downloads Railroad Commission of Texas reports into ./data: the district \
            and county table, oilfield cleanup program reports, well distribution tables \
            and the orphan wells list. PDF text is extracted next to each PDF. Progress is \
            logged to the console and to data/scrape.log; set RUST_LOG to change the level.",
        )
}
