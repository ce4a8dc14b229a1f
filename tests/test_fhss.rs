mod common;

use common::*;
use tsch_scheduling::domain::fhss::fhss_config::FhssConfig;
use tsch_scheduling::domain::fhss::fhss_type::FhssType;
use tsch_scheduling::domain::utils::id::ChannelId;
use tsch_scheduling::error::ConversionError;

fn fhss_config() -> FhssConfig {
    FhssConfig { num_channels: NUM_CHANNELS, blacklist_size: 1, first_best_arms: 2, ..FhssConfig::default() }
}

#[test]
fn test_selection_all_expands_in_selector_order() {
    let all = FhssType::parse_selection("ALL").unwrap();

    assert_eq!(all, FhssType::ALL.to_vec());
    assert_eq!(FhssType::parse_selection("7").unwrap(), all);
    assert_eq!(all[0], FhssType::Fixed);
    assert_eq!(all[6], FhssType::MabGoodArm);
}

#[test]
fn test_variants_parse_from_name_or_selector() {
    assert_eq!("1".parse::<FhssType>(), Ok(FhssType::OpenWsn));
    assert_eq!("FHSS_CENTRALIZED_BLACKLIST".parse::<FhssType>(), Ok(FhssType::CentralizedBlacklist));
    assert_eq!("FHSS_DISTRIBUTED_BLACKLIST_MAB_BEST_ARM".parse::<FhssType>(), Ok(FhssType::MabBestArm));
    assert_eq!("8".parse::<FhssType>(), Err(ConversionError::UnknownFhssType("8".to_string())));
    assert!(FhssType::parse_selection("FHSS_BOGUS").is_err());
}

#[test]
fn test_every_policy_stays_within_the_channel_range() {
    let bed = two_branch();
    let config = fhss_config();
    config.validate().unwrap();

    for fhss_type in FhssType::ALL {
        let mut policy = fhss_type.get_instance(&config, &bed.network, &bed.tree);
        assert_eq!(policy.fhss_type(), fhss_type);

        for asn in 0..300 {
            let channel = policy.select_channel(asn, (n(3), n(1)), (asn % 3) as u8);
            assert!(channel.index() < NUM_CHANNELS, "{} picked channel {}", fhss_type, channel);
            policy.report(asn, (n(3), n(1)), channel, channel.index() % 2 == 0);
        }

        assert_eq!(policy.final_state().fhss_type, fhss_type);
    }
}

#[test]
fn test_fixed_policy_ignores_the_offset() {
    let bed = two_branch();
    let config = FhssConfig { fixed_channel: ChannelId::new(2), ..fhss_config() };
    let mut policy = FhssType::Fixed.get_instance(&config, &bed.network, &bed.tree);

    assert!((0..20).all(|asn| policy.select_channel(asn, (n(1), n(0)), (asn % 4) as u8) == ChannelId::new(2)));
}

#[test]
fn test_centralized_blacklist_drops_the_weakest_channel() {
    // Channel quality fades with the channel index, so channel 3 is the worst on every link
    let bed = two_branch();
    let mut policy = FhssType::CentralizedBlacklist.get_instance(&fhss_config(), &bed.network, &bed.tree);

    let used: Vec<ChannelId> = (0..12).map(|asn| policy.select_channel(asn, (n(1), n(0)), 0)).collect();

    assert!(!used.contains(&ChannelId::new(3)));
    assert_eq!(&used[..3], &[ChannelId::new(0), ChannelId::new(1), ChannelId::new(2)]);
    assert_eq!(policy.final_state().global_blacklist, vec![ChannelId::new(3)]);
}

#[test]
fn test_bandit_converges_on_the_only_working_channel() {
    let bed = two_branch();
    let link = (n(4), n(1));

    for fhss_type in [FhssType::MabBestArm, FhssType::MabFirstBestArms, FhssType::MabGoodArm] {
        let mut policy = fhss_type.get_instance(&fhss_config(), &bed.network, &bed.tree);
        let mut late_hits = 0;

        for asn in 0..600 {
            let channel = policy.select_channel(asn, link, 0);
            let delivered = channel == ChannelId::new(2);
            policy.report(asn, link, channel, delivered);

            if asn >= 500 && delivered {
                late_hits += 1;
            }
        }

        assert!(late_hits >= 75, "{} exploited channel 2 only {} times out of 100", fhss_type, late_hits);

        let state = policy.final_state();
        let learned = state.link(link.0, link.1).unwrap();
        assert_eq!(learned.ranking[0], ChannelId::new(2));
        assert!(learned.estimates[2] > learned.estimates[0]);
        assert!(!learned.blacklist.contains(&ChannelId::new(2)));
    }
}

#[test]
fn test_bandits_with_the_same_seed_choose_alike() {
    let bed = two_branch();
    let config = FhssConfig { epsilon_init: 0.3, epsilon_max: 0.3, ..fhss_config() };

    let mut first = FhssType::MabGoodArm.get_instance(&config, &bed.network, &bed.tree);
    let mut second = FhssType::MabGoodArm.get_instance(&config, &bed.network, &bed.tree);

    for asn in 0..200 {
        let a = first.select_channel(asn, (n(5), n(2)), 0);
        let b = second.select_channel(asn, (n(5), n(2)), 0);
        assert_eq!(a, b);

        first.report(asn, (n(5), n(2)), a, asn % 3 != 0);
        second.report(asn, (n(5), n(2)), b, asn % 3 != 0);
    }
}
