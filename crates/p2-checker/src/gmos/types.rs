//! GMOS enumerations
//!
//! Every type here persists in a step config as a symbol whose text is the
//! instrument's constant name (`g_G0301`, `CUSTOM_MASK`, ...).

#![allow(non_camel_case_types)]

use crate::symbol::symbol_enum;

symbol_enum! {
    /// Telescope hosting the instrument
    pub enum Site as "site" {
        /// Gemini North (GMOS-N)
        North => "NORTH",
        /// Gemini South (GMOS-S)
        South => "SOUTH",
    }
}

symbol_enum! {
    /// CCD manufacturer
    pub enum DetectorManufacturer as "detector manufacturer" {
        /// E2V deep-depletion CCDs
        E2V => "E2V",
        /// Hamamatsu CCDs
        Hamamatsu => "HAMAMATSU",
    }
}

impl DetectorManufacturer {
    /// Name used in messages
    #[inline]
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::E2V => "E2V",
            Self::Hamamatsu => "HAMAMATSU",
        }
    }

    /// Maximum number of custom regions of interest
    #[inline]
    #[must_use]
    pub fn max_rois(self) -> usize {
        match self {
            Self::E2V => 4,
            Self::Hamamatsu => 5,
        }
    }

    /// Detector rows shuffled for long-slit nod and shuffle
    #[inline]
    #[must_use]
    pub fn shuffle_offset_pixels(self) -> u32 {
        match self {
            Self::E2V => 1536,
            Self::Hamamatsu => 1392,
        }
    }

    /// Unbinned detector width in pixels
    #[inline]
    #[must_use]
    pub fn x_size(self) -> i32 {
        6144
    }

    /// Unbinned detector height in pixels
    #[inline]
    #[must_use]
    pub fn y_size(self) -> i32 {
        match self {
            Self::E2V => 4608,
            Self::Hamamatsu => 4224,
        }
    }

    /// Longest recommended single exposure before cosmic rays dominate
    #[inline]
    #[must_use]
    pub fn max_exposure_secs(self) -> f64 {
        match self {
            Self::E2V => 60.0 * 60.0,
            Self::Hamamatsu => 20.0 * 60.0,
        }
    }

    /// Whether the readout electronics support `count` amplifiers
    #[inline]
    #[must_use]
    pub fn supports(self, count: AmpCount) -> bool {
        matches!(
            (self, count),
            (Self::E2V, AmpCount::Three | AmpCount::Six)
                | (Self::Hamamatsu, AmpCount::Six | AmpCount::Twelve)
        )
    }
}

symbol_enum! {
    /// CCD binning factor along one axis
    pub enum Binning as "binning" {
        /// Unbinned
        One => "ONE",
        /// 2 pixel binning
        Two => "TWO",
        /// 4 pixel binning
        Four => "FOUR",
    }
}

impl Binning {
    /// Binning factor
    #[inline]
    #[must_use]
    pub fn value(self) -> u32 {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Four => 4,
        }
    }
}

symbol_enum! {
    /// Amplifier gain setting
    pub enum AmpGain as "amp gain" {
        /// Low gain
        Low => "LOW",
        /// High gain
        High => "HIGH",
    }
}

symbol_enum! {
    /// Amplifier read-out speed
    pub enum AmpReadMode as "amp read mode" {
        /// Slow read-out
        Slow => "SLOW",
        /// Fast read-out
        Fast => "FAST",
    }
}

symbol_enum! {
    /// Number of read-out amplifiers
    pub enum AmpCount as "amp count" {
        /// Three amplifiers
        Three => "THREE",
        /// Six amplifiers
        Six => "SIX",
        /// Twelve amplifiers
        Twelve => "TWELVE",
    }
}

impl AmpCount {
    /// Name used in messages
    #[inline]
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Three => "Three",
            Self::Six => "Six",
            Self::Twelve => "Twelve",
        }
    }
}

symbol_enum! {
    /// Where the focal plane unit comes from
    pub enum FpuMode as "fpu mode" {
        /// One of the built-in slits or IFUs
        Builtin => "BUILTIN",
        /// A custom MOS mask
        CustomMask => "CUSTOM_MASK",
    }
}

symbol_enum! {
    /// Detector read-out region
    pub enum BuiltinRoi as "builtin ROI" {
        /// Whole detector
        FullFrame => "FULL_FRAME",
        /// Central CCD only
        Ccd2 => "CCD2",
        /// Central spectrum band
        CentralSpectrum => "CENTRAL_SPECTRUM",
        /// Central stamp
        CentralStamp => "CENTRAL_STAMP",
        /// Top spectrum band
        TopSpectrum => "TOP_SPECTRUM",
        /// Bottom spectrum band
        BottomSpectrum => "BOTTOM_SPECTRUM",
        /// Custom regions declared on the instrument
        Custom => "CUSTOM",
    }
}

impl Default for BuiltinRoi {
    fn default() -> Self {
        Self::FullFrame
    }
}

symbol_enum! {
    /// Filter wheel position, named by catalog number
    pub enum Filter as "filter" {
        /// No filter
        NoFilter => "NONE",
        /// GMOS-N g
        g_G0301 => "g_G0301",
        /// GMOS-N r
        r_G0303 => "r_G0303",
        /// GMOS-N i
        i_G0302 => "i_G0302",
        /// GMOS-N z
        z_G0304 => "z_G0304",
        /// GMOS-N Z
        Z_G0322 => "Z_G0322",
        /// GMOS-N Y
        Y_G0323 => "Y_G0323",
        /// GMOS-N r+i
        ri_G0349 => "ri_G0349",
        /// GMOS-N GG455
        GG455_G0305 => "GG455_G0305",
        /// GMOS-N OG515
        OG515_G0306 => "OG515_G0306",
        /// GMOS-N RG610
        RG610_G0307 => "RG610_G0307",
        /// GMOS-N CaT
        CaT_G0309 => "CaT_G0309",
        /// GMOS-N H-alpha
        Ha_G0310 => "Ha_G0310",
        /// GMOS-N H-alpha continuum
        HaC_G0311 => "HaC_G0311",
        /// GMOS-N DS920
        DS920_G0312 => "DS920_G0312",
        /// GMOS-N [SII]
        SII_G0317 => "SII_G0317",
        /// GMOS-N [OIII]
        OIII_G0318 => "OIII_G0318",
        /// GMOS-N [OIII] continuum
        OIIIC_G0319 => "OIIIC_G0319",
        /// GMOS-N HeII
        HeII_G0320 => "HeII_G0320",
        /// GMOS-N HeII continuum
        HeIIC_G0321 => "HeIIC_G0321",
        /// GMOS-N u
        u_G0308 => "u_G0308",
        /// GMOS-S u
        u_G0332 => "u_G0332",
        /// GMOS-S g
        g_G0325 => "g_G0325",
        /// GMOS-S r
        r_G0326 => "r_G0326",
        /// GMOS-S i
        i_G0327 => "i_G0327",
        /// GMOS-S z
        z_G0328 => "z_G0328",
        /// GMOS-S Z
        Z_G0343 => "Z_G0343",
        /// GMOS-S Y
        Y_G0344 => "Y_G0344",
        /// GMOS-S GG455
        GG455_G0329 => "GG455_G0329",
        /// GMOS-S OG515
        OG515_G0330 => "OG515_G0330",
        /// GMOS-S RG610
        RG610_G0331 => "RG610_G0331",
        /// GMOS-S RG780
        RG780_G0334 => "RG780_G0334",
        /// GMOS-S CaT
        CaT_G0333 => "CaT_G0333",
        /// GMOS-S H-alpha
        Ha_G0336 => "Ha_G0336",
        /// GMOS-S [SII]
        SII_G0335 => "SII_G0335",
        /// GMOS-S H-alpha continuum
        HaC_G0337 => "HaC_G0337",
        /// GMOS-S [OIII]
        OIII_G0338 => "OIII_G0338",
        /// GMOS-S [OIII] continuum
        OIIIC_G0339 => "OIIIC_G0339",
        /// GMOS-S HeII
        HeII_G0340 => "HeII_G0340",
        /// GMOS-S HeII continuum
        HeIIC_G0341 => "HeIIC_G0341",
        /// GMOS-S Lyman-alpha 395
        Lya395_G0342 => "Lya395_G0342",
    }
}

impl Filter {
    /// Whether the wheel is empty
    #[inline]
    #[must_use]
    pub fn is_none(self) -> bool {
        self == Self::NoFilter
    }
}

symbol_enum! {
    /// Grating or mirror in the beam
    pub enum Disperser as "disperser" {
        /// Imaging mirror
        Mirror => "MIRROR",
        /// GMOS-N B1200
        B1200_G5301 => "B1200_G5301",
        /// GMOS-N R831
        R831_G5302 => "R831_G5302",
        /// GMOS-N B600, superseded by B600_G5307
        B600_G5303 => "B600_G5303",
        /// GMOS-N B600
        B600_G5307 => "B600_G5307",
        /// GMOS-N R600
        R600_G5304 => "R600_G5304",
        /// GMOS-N B480
        B480_G5309 => "B480_G5309",
        /// GMOS-N R400
        R400_G5305 => "R400_G5305",
        /// GMOS-N R400 (second copy)
        R400_G5310 => "R400_G5310",
        /// GMOS-N R150
        R150_G5306 => "R150_G5306",
        /// GMOS-N R150 (second copy)
        R150_G5308 => "R150_G5308",
        /// GMOS-S B1200
        B1200_G5321 => "B1200_G5321",
        /// GMOS-S R831
        R831_G5322 => "R831_G5322",
        /// GMOS-S B600
        B600_G5323 => "B600_G5323",
        /// GMOS-S R600
        R600_G5324 => "R600_G5324",
        /// GMOS-S B480
        B480_G5327 => "B480_G5327",
        /// GMOS-S R400
        R400_G5325 => "R400_G5325",
        /// GMOS-S R150
        R150_G5326 => "R150_G5326",
    }
}

impl Disperser {
    /// Whether this is the imaging mirror
    #[inline]
    #[must_use]
    pub fn is_mirror(self) -> bool {
        self == Self::Mirror
    }
}

symbol_enum! {
    /// Focal plane unit
    pub enum Fpu as "FPU" {
        /// Nothing in the focal plane (imaging)
        None => "FPU_NONE",
        /// Longslit 0.25 arcsec
        Longslit1 => "LONGSLIT_1",
        /// Longslit 0.50 arcsec
        Longslit2 => "LONGSLIT_2",
        /// Longslit 0.75 arcsec
        Longslit3 => "LONGSLIT_3",
        /// Longslit 1.00 arcsec
        Longslit4 => "LONGSLIT_4",
        /// Longslit 1.50 arcsec
        Longslit5 => "LONGSLIT_5",
        /// Longslit 2.00 arcsec
        Longslit6 => "LONGSLIT_6",
        /// Longslit 5.00 arcsec
        Longslit7 => "LONGSLIT_7",
        /// IFU, two slits
        Ifu1 => "IFU_1",
        /// IFU, left (blue) slit
        Ifu2 => "IFU_2",
        /// IFU, right (red) slit
        Ifu3 => "IFU_3",
        /// IFU nod and shuffle, two slits (GMOS-S)
        IfuN => "IFU_N",
        /// IFU nod and shuffle, left slit (GMOS-S)
        IfuNB => "IFU_N_B",
        /// IFU nod and shuffle, right slit (GMOS-S)
        IfuNR => "IFU_N_R",
        /// bHROS fibre feed (GMOS-S)
        Bhros => "BHROS",
        /// N&S slit 0.25 arcsec (GMOS-N)
        Ns0 => "NS_0",
        /// N&S slit 0.50 arcsec
        Ns1 => "NS_1",
        /// N&S slit 0.75 arcsec
        Ns2 => "NS_2",
        /// N&S slit 1.00 arcsec
        Ns3 => "NS_3",
        /// N&S slit 1.50 arcsec
        Ns4 => "NS_4",
        /// N&S slit 2.00 arcsec
        Ns5 => "NS_5",
        /// Custom MOS mask
        CustomMask => "CUSTOM_MASK",
    }
}

impl Fpu {
    /// No FPU, so the instrument is imaging
    #[inline]
    #[must_use]
    pub fn is_imaging(self) -> bool {
        self == Self::None
    }

    /// One of the long slits
    #[must_use]
    pub fn is_spectroscopic(self) -> bool {
        matches!(
            self,
            Self::Longslit1
                | Self::Longslit2
                | Self::Longslit3
                | Self::Longslit4
                | Self::Longslit5
                | Self::Longslit6
                | Self::Longslit7
        )
    }

    /// Any integral field unit
    #[must_use]
    pub fn is_ifu(self) -> bool {
        matches!(
            self,
            Self::Ifu1 | Self::Ifu2 | Self::Ifu3 | Self::IfuN | Self::IfuNB | Self::IfuNR
        )
    }

    /// Usable for nod and shuffle
    #[must_use]
    pub fn is_ns(self) -> bool {
        self.is_ns_slit() || matches!(self, Self::IfuN | Self::IfuNB | Self::IfuNR)
    }

    /// One of the nod and shuffle slits
    #[must_use]
    pub fn is_ns_slit(self) -> bool {
        matches!(
            self,
            Self::Ns0 | Self::Ns1 | Self::Ns2 | Self::Ns3 | Self::Ns4 | Self::Ns5
        )
    }
}
