/// DNS resource record types, including the query-only AXFR meta type.
///
/// A zone transfer has to carry through whatever record types the master
/// holds, so unknown values are preserved verbatim instead of being
/// collapsed onto a default.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum RrType {
    #[default]
    A,
    NS,
    CNAME,
    SOA,
    PTR,
    MX,
    TXT,
    AAAA,
    SRV,
    DS,
    RRSIG,
    NSEC,
    DNSKEY,
    AXFR,
    Unknown(u16),
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum RrClass {
    #[default]
    IN,
    CH,
    HS,
    Unknown(u16),
}

impl From<u16> for RrType {
    fn from(value: u16) -> Self {
        match value {
            1 => RrType::A,
            2 => RrType::NS,
            5 => RrType::CNAME,
            6 => RrType::SOA,
            12 => RrType::PTR,
            15 => RrType::MX,
            16 => RrType::TXT,
            28 => RrType::AAAA,
            33 => RrType::SRV,
            43 => RrType::DS,
            46 => RrType::RRSIG,
            47 => RrType::NSEC,
            48 => RrType::DNSKEY,
            252 => RrType::AXFR,
            x => RrType::Unknown(x),
        }
    }
}

impl From<RrType> for u16 {
    fn from(value: RrType) -> u16 {
        match value {
            RrType::A => 1,
            RrType::NS => 2,
            RrType::CNAME => 5,
            RrType::SOA => 6,
            RrType::PTR => 12,
            RrType::MX => 15,
            RrType::TXT => 16,
            RrType::AAAA => 28,
            RrType::SRV => 33,
            RrType::DS => 43,
            RrType::RRSIG => 46,
            RrType::NSEC => 47,
            RrType::DNSKEY => 48,
            RrType::AXFR => 252,
            RrType::Unknown(x) => x,
        }
    }
}

impl From<u16> for RrClass {
    fn from(value: u16) -> Self {
        match value {
            1 => RrClass::IN,
            3 => RrClass::CH,
            4 => RrClass::HS,
            x => RrClass::Unknown(x),
        }
    }
}

impl From<RrClass> for u16 {
    fn from(value: RrClass) -> u16 {
        match value {
            RrClass::IN => 1,
            RrClass::CH => 3,
            RrClass::HS => 4,
            RrClass::Unknown(x) => x,
        }
    }
}

impl std::fmt::Display for RrType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RrType::A => write!(f, "A"),
            RrType::NS => write!(f, "NS"),
            RrType::CNAME => write!(f, "CNAME"),
            RrType::SOA => write!(f, "SOA"),
            RrType::PTR => write!(f, "PTR"),
            RrType::MX => write!(f, "MX"),
            RrType::TXT => write!(f, "TXT"),
            RrType::AAAA => write!(f, "AAAA"),
            RrType::SRV => write!(f, "SRV"),
            RrType::DS => write!(f, "DS"),
            RrType::RRSIG => write!(f, "RRSIG"),
            RrType::NSEC => write!(f, "NSEC"),
            RrType::DNSKEY => write!(f, "DNSKEY"),
            RrType::AXFR => write!(f, "AXFR"),
            // RFC 3597 generic type name
            RrType::Unknown(x) => write!(f, "TYPE{}", x),
        }
    }
}

impl std::fmt::Display for RrClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RrClass::IN => write!(f, "IN"),
            RrClass::CH => write!(f, "CH"),
            RrClass::HS => write!(f, "HS"),
            RrClass::Unknown(x) => write!(f, "CLASS{}", x),
        }
    }
}

impl std::str::FromStr for RrClass {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "IN" => Ok(RrClass::IN),
            "CH" => Ok(RrClass::CH),
            "HS" => Ok(RrClass::HS),
            _ => Err(()),
        }
    }
}
