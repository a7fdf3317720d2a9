//! Enumerations used by the flow topology.
//!
//! Only the enumerations a product flow network touches live here; the
//! literal strings are the schema values, verbatim.

use crate::enumeration;

enumeration! {
    /// Kind of facility a unit or port represents.
    pub enum ReportingFacility : "ReportingFacility" {
        BlockValve => "block valve",
        Bottomhole => "bottomhole",
        Casing => "casing",
        Choke => "choke",
        Company => "company",
        Completion => "completion",
        Compressor => "compressor",
        Controller => "controller",
        Country => "country",
        County => "county",
        DistributedTemperatureSensingSystem => "distributed temperature sensing system",
        DownholeMonitoringSystem => "downhole monitoring system",
        ElectricSubmersiblePump => "electric submersible pump",
        Field => "field",
        FieldArea => "field - area",
        FieldGroup => "field - group",
        FieldPart => "field - part",
        Flowline => "flowline",
        Formation => "formation",
        GasLiftValveMandrel => "gas lift valve mandrel",
        Generator => "generator",
        HeatExchanger => "heat exchanger",
        Lease => "lease",
        License => "license",
        Manifold => "manifold",
        Meter => "meter",
        Motor => "motor",
        Pipeline => "pipeline",
        Platform => "platform",
        PressureMeter => "pressure meter",
        ProductionTubing => "production tubing",
        Pump => "pump",
        RegulatingValve => "regulating valve",
        Reservoir => "reservoir",
        Riser => "riser",
        Separator => "separator",
        SleeveValve => "sleeve valve",
        State => "state",
        Storage => "storage",
        SubseaTemplate => "subsea template",
        Tank => "tank",
        Terminal => "terminal",
        Turbine => "turbine",
        TubingHead => "tubing head",
        Well => "well",
        WellGroup => "well group",
        Wellhead => "wellhead",
        Zone => "zone",
        Unknown => "unknown",
    }
}

enumeration! {
    /// Product carried through a port.
    pub enum ReportingProduct : "ReportingProduct" {
        Aromatic => "aromatic",
        Butane => "butane",
        C2C4N2 => "c2-c4+n2",
        C5Plus => "c5+",
        CarbonDioxideGas => "carbon dioxide gas",
        Chemical => "chemical",
        Condensate => "condensate",
        CondensateGross => "condensate - gross",
        CondensateNet => "condensate - net",
        CrudeStabilized => "crude - stabilized",
        Diesel => "diesel",
        Ethane => "ethane",
        Gas => "gas",
        GasComponentInOil => "gas - component in oil",
        GasComponentInWater => "gas - component in water",
        GasDry => "gas - dry",
        GasRich => "gas - rich",
        GasWet => "gas - wet",
        LiquefiedNaturalGas => "liquefied natural gas",
        LiquefiedPetroleumGas => "liquefied petroleum gas",
        Liquid => "liquid",
        Methane => "methane",
        NaturalGasLiquid => "natural gas liquid",
        Nitrogen => "nitrogen",
        Oil => "oil",
        OilComponentInWater => "oil - component in water",
        OilGross => "oil - gross",
        OilNet => "oil - net",
        OilAndGas => "oil and gas",
        Propane => "propane",
        Sand => "sand",
        Steam => "steam",
        Sulfur => "sulfur",
        Vapor => "vapor",
        Water => "water",
        WaterDischarge => "water - discharge",
        WaterProcessed => "water - processed",
        Unknown => "unknown",
    }
}

enumeration! {
    /// Flow type through a port.
    pub enum ReportingFlow : "ReportingFlow" {
        Consume => "consume",
        ConsumeBlackStart => "consume - black start",
        ConsumeCompressor => "consume - compressor",
        ConsumeFlare => "consume - flare",
        ConsumeFuel => "consume - fuel",
        ConsumeVent => "consume - vent",
        Disposal => "disposal",
        Export => "export",
        ExportNorm => "export - norm",
        ExportCargo => "export - cargo",
        Fuel => "fuel",
        GasLift => "gas lift",
        GasLiquidRatio => "gas liquid ratio",
        Hydrocarbon => "hydrocarbon",
        Import => "import",
        Injection => "injection",
        Inventory => "inventory",
        Production => "production",
        ProductionGross => "production - gross",
        ProductionNet => "production - net",
        Sale => "sale",
        Storage => "storage",
        Transfer => "transfer",
        Unknown => "unknown",
    }
}

enumeration! {
    /// Nominal direction of a port, relative to its parent.
    pub enum ProductFlowPortType : "ProductFlowPortType" {
        Inlet => "inlet",
        Outlet => "outlet",
        Unknown => "unknown",
    }
}
