// pf-core/src/units.rs

use uom::si::f64::{
    Angle as UomAngle, Area as UomArea, Energy as UomEnergy, HeatTransfer as UomHeatTransfer,
    Length as UomLength, MassDensity as UomMassDensity, Power as UomPower, Ratio as UomRatio,
    SpecificHeatCapacity as UomSpecificHeatCapacity,
    TemperatureInterval as UomTemperatureInterval,
    ThermalConductivity as UomThermalConductivity,
    ThermodynamicTemperature as UomThermodynamicTemperature, Time as UomTime, Volume as UomVolume,
};

// Public canonical unit types (SI, f64)
pub type Angle = UomAngle;
pub type Area = UomArea;
pub type Energy = UomEnergy;
pub type HeatTransfer = UomHeatTransfer;
pub type Length = UomLength;
pub type Density = UomMassDensity;
pub type Power = UomPower;
pub type Ratio = UomRatio;
pub type SpecHeat = UomSpecificHeatCapacity;
pub type TempInterval = UomTemperatureInterval;
pub type Temperature = UomThermodynamicTemperature;
pub type Conductivity = UomThermalConductivity;
pub type Time = UomTime;
pub type Volume = UomVolume;

#[inline]
pub fn k(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::kelvin;
    Temperature::new::<kelvin>(v)
}

#[inline]
pub fn m(v: f64) -> Length {
    use uom::si::length::meter;
    Length::new::<meter>(v)
}

#[inline]
pub fn s(v: f64) -> Time {
    use uom::si::time::second;
    Time::new::<second>(v)
}

#[inline]
pub fn w(v: f64) -> Power {
    use uom::si::power::watt;
    Power::new::<watt>(v)
}

#[inline]
pub fn rad(v: f64) -> Angle {
    use uom::si::angle::radian;
    Angle::new::<radian>(v)
}

#[inline]
pub fn unitless(v: f64) -> Ratio {
    use uom::si::ratio::ratio;
    Ratio::new::<ratio>(v)
}

#[inline]
pub fn w_per_m2k(v: f64) -> HeatTransfer {
    use uom::si::heat_transfer::watt_per_square_meter_kelvin;
    HeatTransfer::new::<watt_per_square_meter_kelvin>(v)
}

#[inline]
pub fn kg_per_m3(v: f64) -> Density {
    use uom::si::mass_density::kilogram_per_cubic_meter;
    Density::new::<kilogram_per_cubic_meter>(v)
}

pub mod constants {
    /// Stefan-Boltzmann constant [W/(m²·K⁴)]
    pub const STEFAN_BOLTZMANN: f64 = 5.670_374_419e-8;

    /// Upper temperature sanity factor relative to the vaporization temperature.
    pub const TEMPERATURE_CEILING_FACTOR: f64 = 2.0;
}
