//! Characteristic categories known to the mirror.

use crate::category::wire_enum;

wire_enum! {
    /// The kind of a characteristic, independent of the service hosting it.
    pub enum CharacteristicCategory {
        PowerState = ("00000025-0000-1000-8000-0026BB765291", "Power State"),
        Brightness = ("00000008-0000-1000-8000-0026BB765291", "Brightness"),
        Hue = ("00000013-0000-1000-8000-0026BB765291", "Hue"),
        Saturation = ("0000002F-0000-1000-8000-0026BB765291", "Saturation"),
        ColorTemperature = ("000000CE-0000-1000-8000-0026BB765291", "Color Temperature"),
        CurrentTemperature = ("00000011-0000-1000-8000-0026BB765291", "Current Temperature"),
        TargetTemperature = ("00000035-0000-1000-8000-0026BB765291", "Target Temperature"),
        CurrentRelativeHumidity = ("00000010-0000-1000-8000-0026BB765291", "Current Relative Humidity"),
        ContactState = ("0000006A-0000-1000-8000-0026BB765291", "Contact State"),
        MotionDetected = ("00000022-0000-1000-8000-0026BB765291", "Motion Detected"),
        OccupancyDetected = ("00000071-0000-1000-8000-0026BB765291", "Occupancy Detected"),
        CurrentSecuritySystemState = ("00000066-0000-1000-8000-0026BB765291", "Current Security System State"),
        TargetSecuritySystemState = ("00000067-0000-1000-8000-0026BB765291", "Target Security System State"),
        LockCurrentState = ("0000001D-0000-1000-8000-0026BB765291", "Lock Current State"),
        LockTargetState = ("0000001E-0000-1000-8000-0026BB765291", "Lock Target State"),
        CurrentDoorState = ("0000000E-0000-1000-8000-0026BB765291", "Current Door State"),
        TargetDoorState = ("00000032-0000-1000-8000-0026BB765291", "Target Door State"),
        CurrentPosition = ("0000006D-0000-1000-8000-0026BB765291", "Current Position"),
        TargetPosition = ("0000007C-0000-1000-8000-0026BB765291", "Target Position"),
        BatteryLevel = ("00000068-0000-1000-8000-0026BB765291", "Battery Level"),
        StatusLowBattery = ("00000079-0000-1000-8000-0026BB765291", "Status Low Battery"),
        OutletInUse = ("00000026-0000-1000-8000-0026BB765291", "Outlet In Use"),
        LeakDetected = ("00000070-0000-1000-8000-0026BB765291", "Leak Detected"),
        SmokeDetected = ("00000076-0000-1000-8000-0026BB765291", "Smoke Detected"),
        CarbonMonoxideDetected = ("00000069-0000-1000-8000-0026BB765291", "Carbon Monoxide Detected"),
        AirQuality = ("00000095-0000-1000-8000-0026BB765291", "Air Quality"),
        CurrentLightLevel = ("0000006B-0000-1000-8000-0026BB765291", "Current Light Level"),
        Active = ("000000B0-0000-1000-8000-0026BB765291", "Active"),
        RotationSpeed = ("00000029-0000-1000-8000-0026BB765291", "Rotation Speed"),
        ProgrammableSwitchEvent = ("00000073-0000-1000-8000-0026BB765291", "Programmable Switch Event"),
        StatusActive = ("00000075-0000-1000-8000-0026BB765291", "Status Active"),
        Name = ("00000023-0000-1000-8000-0026BB765291", "Name"),
    }
}
