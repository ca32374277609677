//! Built-in questions.

use super::Question;

fn q(
    id: &str,
    category: &str,
    difficulty: u8,
    text: &str,
    options: [&str; 4],
    correct_answer: usize,
    explanation: &str,
) -> Question {
    Question {
        id: id.to_string(),
        text: text.to_string(),
        options: options.iter().map(|o| o.to_string()).collect(),
        correct_answer,
        explanation: explanation.to_string(),
        category: category.to_string(),
        difficulty,
    }
}

/// Asked when the bank has nothing at all to offer.
pub fn fallback_question() -> Question {
    q(
        "default_inverse_square",
        "radiation_physics",
        1,
        "Doubling the distance from a point source changes the intensity by what factor?",
        ["1/2", "1/4", "2", "4"],
        1,
        "Intensity falls with the inverse square of distance.",
    )
}

pub fn default_questions() -> Vec<Question> {
    vec![
        q(
            "rp_photoelectric",
            "radiation_physics",
            1,
            "Which interaction dominates for low-energy photons in high-Z materials?",
            ["Compton scattering", "Photoelectric effect", "Pair production", "Rayleigh scattering"],
            1,
            "Photoelectric absorption scales roughly with Z^3/E^3.",
        ),
        q(
            "rp_pair_threshold",
            "radiation_physics",
            2,
            "What is the threshold photon energy for pair production in the nuclear field?",
            ["0.511 MeV", "1.022 MeV", "2.044 MeV", "10 MeV"],
            1,
            "Two electron rest masses, 2 x 0.511 MeV.",
        ),
        q(
            "rp_hvl",
            "radiation_physics",
            3,
            "A beam passes through three half-value layers. What fraction is transmitted?",
            ["1/3", "1/6", "1/8", "1/9"],
            2,
            "(1/2)^3 = 1/8.",
        ),
        q(
            "dos_gray",
            "dosimetry",
            1,
            "One gray equals:",
            ["1 J/kg", "100 rad per kg", "1 erg/g", "1 C/kg"],
            0,
            "The gray is one joule absorbed per kilogram.",
        ),
        q(
            "dos_tg51",
            "dosimetry",
            2,
            "Which protocol is commonly used for reference dosimetry of external beams in North America?",
            ["TG-43", "TG-51", "TG-142", "TG-100"],
            1,
            "TG-51 covers absorbed-dose calibration of high-energy beams.",
        ),
        q(
            "dos_kq",
            "dosimetry",
            3,
            "The factor k_Q in reference dosimetry corrects for:",
            [
                "Temperature and pressure",
                "Beam quality differences from the calibration beam",
                "Ion recombination",
                "Polarity effects",
            ],
            1,
            "k_Q converts the Co-60 calibration coefficient to the user's beam quality.",
        ),
        q(
            "rb_4rs",
            "radiobiology",
            1,
            "Which is NOT one of the classic four Rs of radiobiology?",
            ["Repair", "Reoxygenation", "Redistribution", "Resonance"],
            3,
            "The four Rs are repair, reoxygenation, redistribution and repopulation.",
        ),
        q(
            "rb_alpha_beta",
            "radiobiology",
            2,
            "Late-responding tissues typically have an alpha/beta ratio of about:",
            ["1-4 Gy", "10 Gy", "20 Gy", "50 Gy"],
            0,
            "Late effects are associated with low alpha/beta ratios.",
        ),
        q(
            "rb_oer",
            "radiobiology",
            3,
            "The oxygen enhancement ratio for low-LET radiation at high doses is approximately:",
            ["1.0", "1.5", "2.5-3", "10"],
            2,
            "Fully oxygenated cells are roughly three times more sensitive.",
        ),
        q(
            "img_hu_water",
            "imaging",
            1,
            "What is the CT number of water?",
            ["-1000 HU", "0 HU", "100 HU", "1000 HU"],
            1,
            "The Hounsfield scale is defined with water at 0.",
        ),
        q(
            "img_mri_t1",
            "imaging",
            2,
            "In T1-weighted MRI, fat appears:",
            ["Dark", "Bright", "Invisible", "Identical to water"],
            1,
            "Fat has a short T1 and is bright on T1-weighted images.",
        ),
        q(
            "prot_alara",
            "radiation_protection",
            1,
            "The three basic protective measures are time, distance and:",
            ["Speed", "Shielding", "Filtration", "Collimation"],
            1,
            "Time, distance, shielding.",
        ),
        q(
            "prot_occupational",
            "radiation_protection",
            2,
            "The annual effective dose limit for occupational workers (ICRP) averaged over 5 years is:",
            ["1 mSv", "5 mSv", "20 mSv", "50 mSv"],
            2,
            "20 mSv per year averaged over five years, no year above 50 mSv.",
        ),
        q(
            "tp_ptv",
            "treatment_planning",
            1,
            "Which volume accounts for setup uncertainty and organ motion?",
            ["GTV", "CTV", "PTV", "OAR"],
            2,
            "The planning target volume adds margins to the CTV.",
        ),
        q(
            "tp_dvh",
            "treatment_planning",
            2,
            "A cumulative DVH plots, for each dose, the volume receiving:",
            ["Exactly that dose", "At least that dose", "At most that dose", "The mean dose"],
            1,
            "Cumulative DVHs show volume receiving at least the given dose.",
        ),
        q(
            "tp_imrt_mu",
            "treatment_planning",
            3,
            "Compared with 3D conformal plans, IMRT plans usually require:",
            ["Fewer monitor units", "More monitor units", "No QA", "Lower beam energies"],
            1,
            "Modulation increases total monitor units.",
        ),
    ]
}
