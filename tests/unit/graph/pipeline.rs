use super::*;

#[test]
fn linear_chain_links_consecutive_elements() {
    let p = PipelineSpec::parse("proxysrc name=in ! videoflip name=flip ! proxysink name=out")
        .unwrap();
    assert_eq!(p.elements.len(), 3);
    assert_eq!(p.links, vec![(0, 1), (1, 2)]);
    assert_eq!(p.element("flip").unwrap().kind, "videoflip");
    assert!(p.element("crop").is_none());
}

#[test]
fn references_start_new_branches() {
    let p = PipelineSpec::parse(
        "filesrc name=src ! decodebin name=demux \
         demux. ! videoconvert ! proxysink name=video_out \
         demux. ! audioconvert ! audioresample ! proxysink name=audio_out",
    )
    .unwrap();
    // filesrc -> decodebin, decodebin -> videoconvert -> proxysink, decodebin -> audioconvert ...
    assert!(p.links.contains(&(0, 1)));
    assert!(p.links.contains(&(1, 2)));
    assert!(p.links.contains(&(1, 4)));
    assert!(p.links.contains(&(5, 6)));
    assert!(p.element("src").unwrap().props.is_empty());
}

#[test]
fn ports_come_from_named_proxies() {
    let p = PipelineSpec::parse("proxysrc name=in ! proxysink name=out").unwrap();
    let ports = p.ports();
    assert_eq!(ports.len(), 2);
    assert_eq!(ports[0].name, "in");
    assert_eq!(ports[0].direction, Direction::In);
    assert_eq!(ports[1].name, "out");
    assert_eq!(ports[1].direction, Direction::Out);
    assert_eq!(ports[0].medium, Medium::Any);
}

#[test]
fn medium_is_inferred_from_neighbours() {
    let p = PipelineSpec::parse("proxysrc name=sink_in ! alsasink name=sink").unwrap();
    assert_eq!(p.ports()[0].medium, Medium::Audio);

    let p = PipelineSpec::parse("filesrc ! videoconvert ! proxysink name=out").unwrap();
    assert_eq!(p.ports()[0].medium, Medium::Video);

    let p = PipelineSpec::parse("proxysrc name=audio_in ! fakesink").unwrap();
    assert_eq!(p.ports()[0].medium, Medium::Audio);
}

#[test]
fn malformed_descriptions_are_rejected() {
    assert!(PipelineSpec::parse("").is_err());
    assert!(PipelineSpec::parse("! proxysink").is_err());
    assert!(PipelineSpec::parse("proxysrc ! ! proxysink").is_err());
    assert!(PipelineSpec::parse("proxysrc name=in !").is_err());
    assert!(PipelineSpec::parse("missing. ! proxysink").is_err());
    assert!(PipelineSpec::parse("proxysrc name=a ! proxysink name=a").is_err());
}
