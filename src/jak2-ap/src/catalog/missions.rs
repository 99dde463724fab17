//! Mission catalog
//!
//! Main mission names are taken from the game; side mission names follow the
//! community wiki. Ids are the stable catalog numbers used by the
//! multiworld, not the game's internal enumeration.

use super::{MissionKind, MissionRecord};

pub const MAIN_MISSIONS: &[MissionRecord] = &[
    MissionRecord::new(1, "Escape From Prison", MissionKind::Main),
    MissionRecord::new(2, "Protect Kor and Kid", MissionKind::Main),
    MissionRecord::new(3, "Retrieve Banner from Dead Town", MissionKind::Main),
    MissionRecord::new(4, "Find Pumping Station Valve", MissionKind::Main),
    MissionRecord::new(5, "Blow up Ammo at Fortress", MissionKind::Main),
    MissionRecord::new(6, "Make delivery to Hip Hog Saloon", MissionKind::Main),
    MissionRecord::new(7, "Beat Scatter Gun Course", MissionKind::Main),
    MissionRecord::new(8, "Protect Sig at Pumping Station", MissionKind::Main),
    MissionRecord::new(9, "Destroy Turrets in Sewers", MissionKind::Main),
    MissionRecord::new(10, "Rescue Vin at Strip Mine", MissionKind::Main),
    MissionRecord::new(11, "Find Pumping Station Patrol", MissionKind::Main),
    MissionRecord::new(12, "Find Lens in Mountain Temple", MissionKind::Main),
    MissionRecord::new(13, "Find Gear in Mountain Temple", MissionKind::Main),
    MissionRecord::new(14, "Find Shard in Mountain Temple", MissionKind::Main),
    MissionRecord::new(15, "Beat Time to Race Garage", MissionKind::Main),
    MissionRecord::new(16, "Win JET-Board Stadium Challenge", MissionKind::Main),
    MissionRecord::new(17, "Collect Money for Krew", MissionKind::Main),
    MissionRecord::new(18, "Beat Blaster Gun Course", MissionKind::Main),
    MissionRecord::new(19, "Destroy Eggs at Drill Platform", MissionKind::Main),
    MissionRecord::new(20, "Turn on 5 Power Switches", MissionKind::Main),
    MissionRecord::new(21, "Ride Elevator up to Palace", MissionKind::Main),
    MissionRecord::new(22, "Defeat Baron at Palace", MissionKind::Main),
    MissionRecord::new(23, "Shuttle Underground Fighters", MissionKind::Main),
    MissionRecord::new(24, "Protect Site in Dead Town", MissionKind::Main),
    MissionRecord::new(25, "Catch Scouts in Haven Forest", MissionKind::Main),
    MissionRecord::new(26, "Escort Kid to Power Station", MissionKind::Main),
    MissionRecord::new(27, "Destroy Equipment at Dig", MissionKind::Main),
    MissionRecord::new(28, "Blow up Strip Mine Eco Wells", MissionKind::Main),
    MissionRecord::new(29, "Destroy Ship at Drill Platform", MissionKind::Main),
    MissionRecord::new(30, "Destroy Cargo in Port", MissionKind::Main),
    MissionRecord::new(31, "Rescue Lurkers for Brutter #1", MissionKind::Main),
    MissionRecord::new(32, "Drain Sewers to find Statue", MissionKind::Main),
    MissionRecord::new(33, "Hunt Haven Forest Metal Heads", MissionKind::Main),
    MissionRecord::new(34, "Intercept Tanker", MissionKind::Main),
    MissionRecord::new(35, "Win Class 3 Race at Stadium", MissionKind::Main),
    MissionRecord::new(36, "Get Seal Piece at Water Slums", MissionKind::Main),
    MissionRecord::new(37, "Get Seal Piece at Dig", MissionKind::Main),
    MissionRecord::new(38, "Destroy 5 HellCat Cruisers", MissionKind::Main),
    MissionRecord::new(39, "Beat Onin Game", MissionKind::Main),
    MissionRecord::new(40, "Use items in No Man's Canyon", MissionKind::Main),
    MissionRecord::new(41, "Pass the first Test of Manhood", MissionKind::Main),
    MissionRecord::new(42, "Pass the second Test of Manhood", MissionKind::Main),
    MissionRecord::new(43, "Defeat Baron in Mar's Tomb", MissionKind::Main),
    MissionRecord::new(44, "Rescue Friends in Fortress", MissionKind::Main),
    MissionRecord::new(45, "Escort men through Sewers", MissionKind::Main),
    MissionRecord::new(46, "Win Class 2 Race at Stadium", MissionKind::Main),
    MissionRecord::new(47, "Protect Hideout from Bombots", MissionKind::Main),
    MissionRecord::new(48, "Beat Erol in Race Challenge", MissionKind::Main),
    MissionRecord::new(49, "Destroy Eggs in Strip Mine", MissionKind::Main),
    MissionRecord::new(50, "Get Life Seed in Dead Town", MissionKind::Main),
    MissionRecord::new(51, "Protect Samos in Haven Forest", MissionKind::Main),
    MissionRecord::new(52, "Destroy Drill Platform Tower", MissionKind::Main),
    MissionRecord::new(53, "Rescue Lurkers for Brutter #2", MissionKind::Main),
    MissionRecord::new(54, "Win Class 1 Race at Stadium", MissionKind::Main),
    MissionRecord::new(55, "Explore Palace", MissionKind::Main),
    MissionRecord::new(56, "Get Heart of Mar in Weapons Lab", MissionKind::Main),
    MissionRecord::new(57, "Beat Krew in Weapons Lab", MissionKind::Main),
    MissionRecord::new(58, "Beat the Metal Head Mash Game", MissionKind::Main),
    MissionRecord::new(59, "Find Sig in Under Port", MissionKind::Main),
    MissionRecord::new(60, "Escort Sig in Under Port", MissionKind::Main),
    MissionRecord::new(61, "Defend Stadium", MissionKind::Main),
    MissionRecord::new(62, "Check the Construction Site", MissionKind::Main),
    MissionRecord::new(63, "Break Barrier at Nest", MissionKind::Main),
    MissionRecord::new(64, "Attack the Metal Head Nest", MissionKind::Main),
    MissionRecord::new(65, "Destroy Metal Kor at Nest", MissionKind::Main),
];

pub const SIDE_MISSIONS: &[MissionRecord] = &[
    MissionRecord::new(1, "Orb Search 1 (Computer #2)", MissionKind::Side),
    MissionRecord::new(2, "Orb Search 2 (Computer #3)", MissionKind::Side),
    MissionRecord::new(3, "Orb Search 3 (Computer #4)", MissionKind::Side),
    MissionRecord::new(4, "Orb Search 4 (Computer #5)", MissionKind::Side),
    MissionRecord::new(5, "Orb Search 5 (Computer #9)", MissionKind::Side),
    MissionRecord::new(6, "Orb Search 6 (Computer #10)", MissionKind::Side),
    MissionRecord::new(7, "Orb Search 7 (Computer #11)", MissionKind::Side),
    MissionRecord::new(8, "Orb Search 8 (Computer #12)", MissionKind::Side),
    MissionRecord::new(9, "Orb Search 9 (Computer #6)", MissionKind::Side),
    MissionRecord::new(10, "Orb Search 10 (Computer #14)", MissionKind::Side),
    MissionRecord::new(11, "Orb Search 11 (Computer #15)", MissionKind::Side),
    MissionRecord::new(12, "Orb Search 12 (Computer #7)", MissionKind::Side),
    MissionRecord::new(13, "Orb Search 13 (Computer #16)", MissionKind::Side),
    MissionRecord::new(14, "Orb Search 14 (Computer #17)", MissionKind::Side),
    MissionRecord::new(15, "Orb Search 15 (Computer #18)", MissionKind::Side),
    MissionRecord::new(16, "Ring Race 1 (Computer #1)", MissionKind::Side),
    MissionRecord::new(17, "Ring Race 2 (Computer #8)", MissionKind::Side),
    MissionRecord::new(18, "Ring Race 3 (Computer #1)", MissionKind::Side),
    MissionRecord::new(19, "Collection 1 (Computer #6)", MissionKind::Side),
    MissionRecord::new(20, "Collection 2 (Computer #13)", MissionKind::Side),
    MissionRecord::new(21, "Collection 3 (Computer #12)", MissionKind::Side),
    MissionRecord::new(22, "Deliver Package Side Mission (Computer #7)", MissionKind::Side),
    MissionRecord::new(23, "Shuttle Underground Fighters Side Mission (Computer #7)", MissionKind::Side),
    MissionRecord::new(24, "Destroy Blast Bots Side Mission (Computer #7)", MissionKind::Side),
    MissionRecord::new(25, "Erol Race Side Mission", MissionKind::Side),
    MissionRecord::new(26, "Port Race Side Mission", MissionKind::Side),
    MissionRecord::new(27, "JET-Board Stadium Challenge Side Mission", MissionKind::Side),
    MissionRecord::new(28, "Class 3 Race Side Mission (Computer by Stadium)", MissionKind::Side),
    MissionRecord::new(29, "Class 2 Race Side Mission (Computer by Stadium)", MissionKind::Side),
    MissionRecord::new(30, "Class 1 Race Side Mission (Computer by Stadium)", MissionKind::Side),
    MissionRecord::new(31, "Class 3R Race Side Mission (Computer by Stadium)", MissionKind::Side),
    MissionRecord::new(32, "Class 2R Race Side Mission (Computer by Stadium)", MissionKind::Side),
    MissionRecord::new(33, "Class 1R Race Side Mission (Computer by Stadium)", MissionKind::Side),
];
